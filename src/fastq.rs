//! Buffered FASTQ reading
//!
//! Records are located in an internal buffer and handed out as
//! [`RefRecord`](struct.RefRecord.html), which borrows from it; a record
//! must therefore fit into the buffer completely, which grows as needed (see
//! [`policy`](../policy/index.html)).
//!
//! Sequence and quality may span several lines. Basecallers such as Guppy write
//! both on a single line, but wrapped files are read as well:
//!
//! ```
//! use plotrt::fastq::Reader;
//!
//! let fastq = b"@id
//! SEQU
//! ENCE
//! +
//! II
//! @EI
//! III
//! ";
//!
//! let mut reader = Reader::new(&fastq[..]);
//! let record = reader.next().unwrap().unwrap();
//! assert_eq!(record.id(), Ok("id"));
//! assert_eq!(record.seq(), b"SEQU\nENCE");
//! assert_eq!(record.qual(), b"II\n@EI\nIII");
//! ```
//!
//! Parsing details:
//!
//! * The line after the header always belongs to the sequence. Further lines are
//!   sequence lines until one starts with `+`; a line starting with `@` before
//!   that means the separator is missing.
//! * Quality lines are collected until they are at least as long as the sequence,
//!   so quality lines starting with `@` are not mistaken for a new record. Longer
//!   qualities are an error.
//! * The ID is the header text up to the first whitespace character.
//! * `\r\n` line endings are accepted, a `\r` before the final newline is never
//!   part of the returned slices.
//! * The last record does not need to end with a newline.
//! * Empty lines after the last record are ignored; anywhere else they are an error.
//!
//! After an error was returned, the reader is finished and `next()` returns `None`.

use memchr::memchr;
use std::error::Error as StdError;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;
use std::str::{self, Utf8Error};

use super::policy::{BufPolicy, StdPolicy};
use super::{fill_buf, trim_cr};

type DefaultBufPolicy = StdPolicy;

const BUFSIZE: usize = 64 * 1024;

/// FASTQ parser.
pub struct Reader<R: io::Read, P = DefaultBufPolicy> {
    buf_reader: buffer_redux::BufReader<R>,
    rec: RecordPos,
    state: SearchPos,
    // line of the current record's header (starting with 1)
    line: u64,
    finished: bool,
    buf_policy: P,
}

impl<R> Reader<R, DefaultBufPolicy>
where
    R: io::Read,
{
    /// Creates a new reader with the default buffer size of 64 KiB
    ///
    /// # Example:
    ///
    /// ```
    /// use plotrt::fastq::Reader;
    /// let fastq = b"@id\nACGT\n+\nIIII";
    ///
    /// let mut reader = Reader::new(&fastq[..]);
    /// let record = reader.next().unwrap().unwrap();
    /// assert_eq!(record.id(), Ok("id"))
    /// ```
    pub fn new(reader: R) -> Reader<R, StdPolicy> {
        Reader::with_capacity(reader, BUFSIZE)
    }

    /// Creates a new reader with a given buffer capacity. The minimum allowed
    /// capacity is 3.
    pub fn with_capacity(reader: R, capacity: usize) -> Reader<R, StdPolicy> {
        assert!(capacity >= 3);
        Reader {
            buf_reader: buffer_redux::BufReader::with_capacity(capacity, reader),
            rec: RecordPos::default(),
            state: SearchPos::Head,
            line: 1,
            finished: false,
            buf_policy: StdPolicy,
        }
    }
}

impl Reader<File, DefaultBufPolicy> {
    /// Creates a reader from a file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> io::Result<Reader<File>> {
        File::open(path).map(Reader::new)
    }
}

impl<R, P> Reader<R, P>
where
    R: io::Read,
    P: BufPolicy,
{
    /// Returns a reader with the given buffer policy applied
    #[inline]
    pub fn set_policy<T: BufPolicy>(self, policy: T) -> Reader<R, T> {
        Reader {
            buf_reader: self.buf_reader,
            rec: self.rec,
            state: self.state,
            line: self.line,
            finished: self.finished,
            buf_policy: policy,
        }
    }

    /// Searches the next FASTQ record and returns a [RefRecord](struct.RefRecord.html)
    /// borrowing its data from the buffer of this reader.
    ///
    /// ```no_run
    /// use plotrt::fastq::Reader;
    ///
    /// let mut reader = Reader::from_path("run.fastq").unwrap();
    ///
    /// while let Some(record) = reader.next() {
    ///     let record = record.unwrap();
    ///     println!("{}", record.id().unwrap());
    /// }
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<Result<RefRecord, Error>> {
        if self.finished {
            return None;
        }

        match self.advance() {
            Ok(true) => Some(Ok(RefRecord {
                buffer: self.get_buf(),
                rec: &self.rec,
            })),
            Ok(false) => None,
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }

    // Locates the next record, returns false if there is none.
    fn advance(&mut self) -> Result<bool, Error> {
        if !self.initialized() && !self.init()? {
            return Ok(false);
        }

        if self.state == SearchPos::Done {
            self.next_pos();
        }

        Ok(self.search()? || self.next_complete()?)
    }

    #[inline(never)]
    fn init(&mut self) -> Result<bool, Error> {
        let n = fill_buf(&mut self.buf_reader)?;
        if n == 0 {
            self.finished = true;
            return Ok(false);
        }
        Ok(true)
    }

    #[inline]
    fn initialized(&self) -> bool {
        !self.get_buf().is_empty()
    }

    #[inline]
    fn get_buf(&self) -> &[u8] {
        self.buf_reader.buffer()
    }

    // Moves the start to the byte after the previous record.
    #[inline]
    fn next_pos(&mut self) {
        let next_start = self.rec.end + 1;
        self.line += self.rec.num_lines();
        self.rec = RecordPos::starting_at(next_start);
        self.state = SearchPos::Head;
    }

    // Continues with the line where the last call stopped. Returns false if the
    // end of the buffer was reached before the record was complete.
    fn search(&mut self) -> Result<bool, Error> {
        while self.state != SearchPos::Done {
            let line_start = self.rec.line;
            let next = unwrap_or!(self.find_line(line_start), {
                return Ok(false);
            });
            let (len, first) = {
                let line = trim_cr(&self.get_buf()[line_start..next - 1]);
                (line.len(), line.first().copied())
            };
            self.rec.line = next;

            match self.state {
                SearchPos::Head => {
                    if len == 0 {
                        // only allowed if nothing but empty lines follows
                        continue;
                    }
                    if line_start != self.rec.start || first != Some(b'@') {
                        return Err(self.invalid_start());
                    }
                    self.rec.seq = next;
                    self.state = SearchPos::Seq;
                }
                SearchPos::Seq => {
                    let is_first = line_start == self.rec.seq;
                    if !is_first && first == Some(b'+') {
                        self.rec.sep = line_start;
                        self.rec.qual = next;
                        self.state = SearchPos::Qual;
                    } else if !is_first && first == Some(b'@') {
                        return Err(Error::InvalidSep {
                            found: b'@',
                            pos: self.get_error_pos(1 + self.rec.seq_lines),
                        });
                    } else {
                        self.rec.seq_len += len;
                        self.rec.seq_lines += 1;
                    }
                }
                SearchPos::Qual => {
                    self.rec.qual_len += len;
                    self.rec.qual_lines += 1;
                    if self.rec.qual_len >= self.rec.seq_len {
                        self.rec.end = next - 1;
                        self.state = SearchPos::Done;
                        self.check_lengths()?;
                    }
                }
                SearchPos::Done => break,
            }
        }
        Ok(true)
    }

    fn check_lengths(&self) -> Result<(), Error> {
        if self.rec.seq_len == self.rec.qual_len {
            return Ok(());
        }
        Err(Error::UnequalLengths {
            seq: self.rec.seq_len,
            qual: self.rec.qual_len,
            pos: self.get_error_pos(0),
        })
    }

    fn invalid_start(&self) -> Error {
        Error::InvalidStart {
            found: self.get_buf()[self.rec.start],
            pos: ErrorPosition {
                line: self.line,
                id: None,
            },
        }
    }

    // The ID is included once the header line is complete
    #[inline(never)]
    fn get_error_pos(&self, offset: u64) -> ErrorPosition {
        let id = if self.state != SearchPos::Head {
            let id = split_id(self.rec.head(self.get_buf()));
            Some(String::from_utf8_lossy(id).into())
        } else {
            None
        };
        ErrorPosition {
            line: self.line + offset,
            id,
        }
    }

    #[inline]
    fn find_line(&self, search_start: usize) -> Option<usize> {
        memchr(b'\n', &self.get_buf()[search_start..]).map(|pos| search_start + pos + 1)
    }

    // Called when the end of the buffer is reached inside a record. Moves the
    // incomplete record to the start of the buffer, or enlarges the buffer if
    // it already starts there, and refills it.
    #[inline(never)]
    fn next_complete(&mut self) -> Result<bool, Error> {
        loop {
            if self.get_buf().len() < self.buf_reader.capacity() {
                // buffer not full after filling -> EOF
                return self.check_end();
            } else if self.rec.start == 0 {
                self.grow()?;
            } else {
                self.make_room();
            }

            fill_buf(&mut self.buf_reader)?;

            if self.search()? {
                return Ok(true);
            }
        }
    }

    // The input ended inside a record or after the last one. The line at
    // `rec.line` has no newline.
    fn check_end(&mut self) -> Result<bool, Error> {
        self.finished = true;
        let last_len = trim_cr(&self.get_buf()[self.rec.line..]).len();

        match self.state {
            SearchPos::Head => {
                if last_len == 0 {
                    return Ok(false);
                }
                if self.rec.line != self.rec.start || self.get_buf()[self.rec.start] != b'@' {
                    return Err(self.invalid_start());
                }
                Err(Error::UnexpectedEnd {
                    pos: self.get_error_pos(0),
                })
            }
            SearchPos::Seq => Err(Error::UnexpectedEnd {
                pos: self.get_error_pos(1 + self.rec.seq_lines),
            }),
            SearchPos::Qual => {
                if last_len > 0 {
                    self.rec.qual_len += last_len;
                    self.rec.qual_lines += 1;
                } else if self.rec.qual_lines == 0 && self.rec.seq_len > 0 {
                    return Err(Error::UnexpectedEnd {
                        pos: self.get_error_pos(2 + self.rec.seq_lines),
                    });
                }
                self.rec.end = self.get_buf().len();
                self.state = SearchPos::Done;
                self.check_lengths()?;
                Ok(true)
            }
            SearchPos::Done => Ok(true),
        }
    }

    fn grow(&mut self) -> Result<(), Error> {
        let cap = self.buf_reader.capacity();
        let new_size = self.buf_policy.grow_to(cap).ok_or(Error::BufferLimit)?;
        self.buf_reader.reserve(new_size - cap);
        Ok(())
    }

    fn make_room(&mut self) {
        let consumed = self.rec.start;
        self.buf_reader.consume(consumed);
        self.buf_reader.make_room();
        self.rec.shift(consumed);
    }

}

/// FASTQ parsing error
#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    /// Sequence and quality lengths are not equal
    UnequalLengths {
        seq: usize,
        qual: usize,
        /// `ErrorPosition::line` is the line of the header
        pos: ErrorPosition,
    },
    /// Record does not start with `@`
    InvalidStart {
        found: u8,
        /// `ErrorPosition::id` is always `None`
        pos: ErrorPosition,
    },
    /// A new record starts before the `+` separator line
    InvalidSep { found: u8, pos: ErrorPosition },
    /// Truncated record
    UnexpectedEnd { pos: ErrorPosition },
    /// `BufPolicy::grow_to()` refused to enlarge the buffer
    BufferLimit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPosition {
    /// Line number where the error occurred (starting with 1)
    pub line: u64,
    /// ID of record if available
    pub id: Option<String>,
}

impl fmt::Display for ErrorPosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(id) = self.id.as_ref() {
            write!(f, "record '{}' at ", id)?;
        }
        write!(f, "line {}", self.line)
    }
}

impl Error {
    /// Position of the error, if it refers to a location in the input
    pub fn position(&self) -> Option<&ErrorPosition> {
        match *self {
            Error::UnequalLengths { ref pos, .. }
            | Error::InvalidStart { ref pos, .. }
            | Error::InvalidSep { ref pos, .. }
            | Error::UnexpectedEnd { ref pos } => Some(pos),
            Error::Io(_) | Error::BufferLimit => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref e) => e.fmt(f),
            Error::UnequalLengths { seq, qual, ref pos } => write!(
                f,
                "FASTQ parse error: sequence length is {}, but quality length is {} ({}).",
                seq, qual, pos
            ),
            Error::InvalidStart { found, ref pos } => write!(
                f,
                "FASTQ parse error: expected '@' at record start but found '{}' ({}).",
                (found as char).escape_default(),
                pos
            ),
            Error::InvalidSep { found, ref pos } => write!(
                f,
                "FASTQ parse error: expected '+' separator but found '{}' ({}).",
                (found as char).escape_default(),
                pos
            ),
            Error::UnexpectedEnd { ref pos } => {
                write!(f, "FASTQ parse error: unexpected end of input ({}).", pos)
            }
            Error::BufferLimit => write!(f, "FASTQ parse error: buffer limit reached."),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::Io(e)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

// The line of the current record whose end is searched next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchPos {
    Head,
    Seq,
    Qual,
    Done,
}

/// Offsets of a record within the buffer
#[derive(Debug, Clone, Default)]
struct RecordPos {
    // '@' of the header
    start: usize,
    // first sequence line
    seq: usize,
    // separator line
    sep: usize,
    // first quality line
    qual: usize,
    // end of the last quality line (newline or end of input), may be preceded by \r
    end: usize,
    // start of the next line to search
    line: usize,
    seq_len: usize,
    qual_len: usize,
    seq_lines: u64,
    qual_lines: u64,
}

impl RecordPos {
    fn starting_at(start: usize) -> RecordPos {
        RecordPos {
            start,
            seq: start,
            sep: start,
            qual: start,
            end: start,
            line: start,
            ..RecordPos::default()
        }
    }

    // all offsets are >= start
    fn shift(&mut self, by: usize) {
        for pos in [
            &mut self.start,
            &mut self.seq,
            &mut self.sep,
            &mut self.qual,
            &mut self.end,
            &mut self.line,
        ] {
            *pos -= by;
        }
    }

    // header, sequence, separator and quality lines
    fn num_lines(&self) -> u64 {
        2 + self.seq_lines + self.qual_lines
    }

    #[inline]
    fn head<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        trim_cr(&buffer[self.start + 1..self.seq - 1])
    }

    #[inline]
    fn seq<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        trim_cr(&buffer[self.seq..self.sep - 1])
    }

    #[inline]
    fn qual<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        trim_cr(&buffer[self.qual..self.end])
    }
}

// Header text up to the first whitespace
#[inline]
fn split_id(head: &[u8]) -> &[u8] {
    match head.iter().position(|b| b.is_ascii_whitespace()) {
        Some(i) => &head[..i],
        None => head,
    }
}

/// A FASTQ record that borrows data from the reader's buffer
#[derive(Debug, Clone)]
pub struct RefRecord<'a> {
    buffer: &'a [u8],
    rec: &'a RecordPos,
}

impl<'a> RefRecord<'a> {
    /// The header line of the record (without `@`)
    #[inline]
    pub fn head(&self) -> &'a [u8] {
        self.rec.head(self.buffer)
    }

    #[inline]
    pub fn id_bytes(&self) -> &'a [u8] {
        split_id(self.head())
    }

    /// The ID of the record (everything before the first whitespace)
    pub fn id(&self) -> Result<&'a str, Utf8Error> {
        str::from_utf8(self.id_bytes())
    }

    /// The sequence; line breaks of wrapped sequences are included.
    #[inline]
    pub fn seq(&self) -> &'a [u8] {
        self.rec.seq(self.buffer)
    }

    /// The qualities; line breaks of wrapped qualities are included.
    #[inline]
    pub fn qual(&self) -> &'a [u8] {
        self.rec.qual(self.buffer)
    }
}
