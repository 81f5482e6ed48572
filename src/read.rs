//! Loading the header information of all reads in a FASTQ file

use std::io;
use std::path::Path;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::fastq::{self, RefRecord};
use crate::policy::BufPolicy;
use crate::{Error, Result};

/// A sequencing read, reduced to what is needed for ordering it in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Read {
    /// Header text up to the first whitespace
    pub id: String,
    /// The whole header line, including the ID
    pub desc: String,
    /// Set by [`sort_reads`](../timestamp/fn.sort_reads.html)
    pub timestamp: Option<NaiveDateTime>,
}

impl Read {
    pub fn new(id: impl Into<String>, desc: impl Into<String>) -> Read {
        Read {
            id: id.into(),
            desc: desc.into(),
            timestamp: None,
        }
    }

    /// Copies ID and header line from a FASTQ record. Invalid UTF-8 is replaced.
    pub fn from_record(record: &RefRecord) -> Read {
        Read {
            id: String::from_utf8_lossy(record.id_bytes()).into_owned(),
            desc: String::from_utf8_lossy(record.head()).into_owned(),
            timestamp: None,
        }
    }
}

/// Collects all reads from a FASTQ reader in file order.
pub fn read_all<R, P>(reader: &mut fastq::Reader<R, P>) -> std::result::Result<Vec<Read>, fastq::Error>
where
    R: io::Read,
    P: BufPolicy,
{
    let mut reads = vec![];
    while let Some(record) = reader.next() {
        reads.push(Read::from_record(&record?));
    }
    Ok(reads)
}

/// Opens a FASTQ file and collects its reads.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Read>> {
    let path = path.as_ref();
    let mut reader = fastq::Reader::from_path(path).map_err(|e| Error::io(path, e))?;
    let reads = read_all(&mut reader).map_err(|source| Error::Fastq {
        path: path.to_owned(),
        source,
    })?;
    debug!(path = %path.display(), reads = reads.len(), "loaded reads");
    Ok(reads)
}
