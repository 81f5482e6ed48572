//! Sorts the reads of nanopore FASTQ files by the time they were basecalled and plots
//! how many reads a run produced over time.
//!
//! Each input file goes through the same linear pipeline:
//!
//! ```text
//!  reads.fastq
//!      │  fastq::Reader        (id, description) per record
//!      ▼
//!  Vec<Read>
//!      │  timestamp::sort_reads   parse `YYYY-MM-DD HH:MM:SS`, stable sort
//!      ▼
//!  SortedReads
//!      │  TimeSeries::from_sorted elapsed hours / cumulative read count
//!      ▼
//!  TimeSeries
//!      │  chart::ChartRenderer   PNG line plot
//!      ▼
//!  <out_dir>/reads.png
//! ```
//!
//! [`batch::run`](batch/fn.run.html) drives the pipeline for a whole
//! [`Config`](batch/struct.Config.html):
//!
//! ```no_run
//! use plotrt::batch::{self, Config};
//! use plotrt::chart::PngChart;
//!
//! let config = Config::new(vec!["runs/".into()], "plots");
//! let summary = batch::run(&config, &mut PngChart::default()).unwrap();
//! println!("{} reads in {} files", summary.reads, summary.files.len());
//! ```
//!
//! # Reading FASTQ
//!
//! The [`fastq`](fastq/index.html) module contains a buffered reader that hands out
//! records borrowing from its internal buffer. Only the header line matters for
//! plotting, but the reader still checks the record structure:
//!
//! ```
//! use plotrt::fastq::Reader;
//!
//! let fastq = b"@read1 start_time=2021-05-01T09:00:00Z\nACGT\n+\nIIII\n";
//! let mut reader = Reader::new(&fastq[..]);
//! let record = reader.next().unwrap().unwrap();
//! assert_eq!(record.id(), Ok("read1"));
//! assert_eq!(record.head(), b"read1 start_time=2021-05-01T09:00:00Z");
//! ```
//!
//! The buffer starts at 64 KiB and grows when a record does not fit; see
//! [`policy`](policy/index.html) for limiting that growth.

use std::io;

macro_rules! unwrap_or {
    ($expr:expr, $or:block) => {
        match $expr {
            Some(item) => item,
            None => $or,
        }
    };
}

pub mod batch;
pub mod chart;
pub mod cli;
mod error;
pub mod fastq;
pub mod policy;
pub mod read;
pub mod series;
pub mod timestamp;

pub use crate::error::{Error, Result};
pub use crate::read::Read;
pub use crate::series::TimeSeries;
pub use crate::timestamp::{SortedReads, TimestampFormat};

/// Remove a final '\r' from a byte slice
#[inline]
fn trim_cr(line: &[u8]) -> &[u8] {
    if let Some((&b'\r', remaining)) = line.split_last() {
        remaining
    } else {
        line
    }
}

/// Reads until the buffer is full or EOF is reached, returns the number of bytes read
fn fill_buf<R>(reader: &mut buffer_redux::BufReader<R>) -> io::Result<usize>
where
    R: io::Read,
{
    let initial_size = reader.buffer().len();
    let mut num_read = 0;
    while initial_size + num_read < reader.capacity() {
        match reader.read_into_buf() {
            Ok(0) => break,
            Ok(n) => num_read += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(num_read)
}
