//! Extracting basecalling timestamps from read descriptions and ordering reads by them
//!
//! Guppy writes the time a read started into the FASTQ header, e.g.
//! `@3f2b... runid=... start_time=2021-05-01T09:30:00Z flow_cell_id=...`.
//! The date-time is found with a regular expression after the ISO `T` separator
//! was replaced by a space. Both the pattern and this replacement are part of
//! [`TimestampFormat`](struct.TimestampFormat.html), so other header layouts only
//! need a different format.

use std::path::Path;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::read::Read;
use crate::Error;

/// Matches `YYYY-MM-DD HH:MM:SS`
pub const DATETIME_PATTERN: &str = r"\d{4}-\d{2}-\d{2}\s\d{2}:\d{2}:\d{2}";

/// `chrono` layout for text matched by `DATETIME_PATTERN`
pub const DATETIME_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

/// ISO 8601 date/time separator, replaced by a space before matching
pub const ISO_SEPARATOR: char = 'T';

/// How to find and parse the timestamp in a read description
#[derive(Debug, Clone)]
pub struct TimestampFormat {
    pattern: Regex,
    layout: String,
    normalize: Option<(char, char)>,
}

impl TimestampFormat {
    /// `pattern` locates the timestamp, `layout` parses the matched text
    /// (see `chrono::format::strftime`).
    pub fn new(pattern: &str, layout: &str) -> Result<TimestampFormat, regex::Error> {
        Ok(TimestampFormat {
            pattern: Regex::new(pattern)?,
            layout: layout.to_string(),
            normalize: None,
        })
    }

    /// Replaces every `from` in the description with `to` before searching.
    pub fn normalize(mut self, from: char, to: char) -> TimestampFormat {
        self.normalize = Some((from, to));
        self
    }

    /// Returns the first timestamp found in `desc`, or `None` if there is no
    /// match or the match is not a valid date and time.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use plotrt::TimestampFormat;
    ///
    /// let fmt = TimestampFormat::default();
    /// let t = fmt.extract("runid=ab12 start_time=2021-05-01T09:30:00Z").unwrap();
    /// assert_eq!(t, NaiveDate::from_ymd_opt(2021, 5, 1).unwrap().and_hms_opt(9, 30, 0).unwrap());
    /// ```
    pub fn extract(&self, desc: &str) -> Option<NaiveDateTime> {
        match self.normalize {
            Some((from, to)) => {
                let normalized: String = desc
                    .chars()
                    .map(|c| if c == from { to } else { c })
                    .collect();
                self.find(&normalized)
            }
            None => self.find(desc),
        }
    }

    fn find(&self, text: &str) -> Option<NaiveDateTime> {
        let m = self.pattern.find(text)?;
        NaiveDateTime::parse_from_str(m.as_str(), &self.layout).ok()
    }
}

impl Default for TimestampFormat {
    /// Guppy's `start_time`, `YYYY-MM-DDTHH:MM:SS` or `YYYY-MM-DD HH:MM:SS`
    fn default() -> TimestampFormat {
        TimestampFormat::new(DATETIME_PATTERN, DATETIME_LAYOUT)
            .expect("DATETIME_PATTERN is a valid regex")
            .normalize(ISO_SEPARATOR, ' ')
    }
}

/// A read without a recognizable timestamp
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no timestamp found in description of read '{id}' (record {record})")]
pub struct MissingTimestamp {
    pub id: String,
    /// 1-based index of the read in its file
    pub record: u64,
}

impl MissingTimestamp {
    pub(crate) fn in_file(self, path: &Path) -> Error {
        Error::MissingTimestamp {
            path: path.to_owned(),
            id: self.id,
            record: self.record,
        }
    }
}

/// Reads in ascending order of their timestamps. Every read has a timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortedReads {
    reads: Vec<Read>,
}

impl SortedReads {
    pub fn reads(&self) -> &[Read] {
        &self.reads
    }

    pub fn into_reads(self) -> Vec<Read> {
        self.reads
    }

    pub fn len(&self) -> usize {
        self.reads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reads.is_empty()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        self.reads.iter().filter_map(|r| r.timestamp)
    }

    /// Earliest and latest timestamp
    pub fn span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let first = self.reads.first()?.timestamp?;
        let last = self.reads.last()?.timestamp?;
        Some((first, last))
    }
}

/// Sets the timestamp of every read and sorts them in ascending order.
/// Reads with equal timestamps keep their input order.
///
/// Fails on the first read without a timestamp, since it could not be
/// placed in the series.
pub fn sort_reads(
    mut reads: Vec<Read>,
    format: &TimestampFormat,
) -> Result<SortedReads, MissingTimestamp> {
    for (i, read) in reads.iter_mut().enumerate() {
        let timestamp = unwrap_or!(format.extract(&read.desc), {
            return Err(MissingTimestamp {
                id: read.id.clone(),
                record: i as u64 + 1,
            });
        });
        read.timestamp = Some(timestamp);
    }
    reads.sort_by_key(|r| r.timestamp);
    Ok(SortedReads { reads })
}
