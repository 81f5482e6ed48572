use std::io;
use std::path::PathBuf;

use crate::fastq;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a plotting run
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{}: {source}", .path.display())]
    Fastq {
        path: PathBuf,
        #[source]
        source: fastq::Error,
    },
    /// `record` is the 1-based index of the read within its file
    #[error("{}: no timestamp found in description of read '{id}' (record {record})", .path.display())]
    MissingTimestamp {
        path: PathBuf,
        id: String,
        record: u64,
    },
    #[error("output directory already exists: {}", .0.display())]
    OutputExists(PathBuf),
    #[error("an output directory (--out_dir) is required when input files are given")]
    MissingOutDir,
    #[error("input is neither a directory nor a .fastq file: {}", .0.display())]
    InvalidInput(PathBuf),
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to draw {}: {message}", .path.display())]
    Chart { path: PathBuf, message: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Error {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
