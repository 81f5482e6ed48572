//! Buffer growth policies for [`fastq::Reader`](../fastq/struct.Reader.html).
//!
//! A whole FASTQ record must fit into the reader's buffer. Nanopore reads can be
//! hundreds of kilobases long, so the buffer grows whenever a record does not fit.
//! The policy decides the new size, or refuses by returning `None`, in which
//! case the reader fails with `Error::BufferLimit`.
//!
//! ```no_run
//! use plotrt::fastq::Reader;
//! use plotrt::policy::DoubleUntilLimited;
//!
//! // double up to 64 MiB, then grow in 64 MiB steps, fail above 1 GiB
//! let policy = DoubleUntilLimited::new(1 << 26, 1 << 30);
//! let mut reader = Reader::from_path("run.fastq").unwrap().set_policy(policy);
//! # let _ = reader.next();
//! ```

/// Decides how a reader buffer grows.
///
/// Receives the current capacity in bytes and returns the capacity to grow to.
pub trait BufPolicy {
    fn grow_to(&mut self, current_size: usize) -> Option<usize>;
}

/// Doubles until 8 MiB, then grows in steps of 8 MiB without limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdPolicy;

impl BufPolicy for StdPolicy {
    fn grow_to(&mut self, current_size: usize) -> Option<usize> {
        DoubleUntil(1 << 23).grow_to(current_size)
    }
}

/// Doubles until the given size (in bytes), then grows linearly in steps of
/// that size. Never refuses.
#[derive(Debug, Clone, Copy)]
pub struct DoubleUntil(pub usize);

impl BufPolicy for DoubleUntil {
    fn grow_to(&mut self, current_size: usize) -> Option<usize> {
        Some(if current_size < self.0 {
            current_size * 2
        } else {
            current_size + self.0
        })
    }
}

/// Like `DoubleUntil`, but refuses to grow beyond `limit` bytes.
#[derive(Debug, Clone, Copy)]
pub struct DoubleUntilLimited {
    double_until: usize,
    limit: usize,
}

impl DoubleUntilLimited {
    pub fn new(double_until: usize, limit: usize) -> Self {
        DoubleUntilLimited {
            double_until,
            limit,
        }
    }
}

impl BufPolicy for DoubleUntilLimited {
    fn grow_to(&mut self, current_size: usize) -> Option<usize> {
        DoubleUntil(self.double_until)
            .grow_to(current_size)
            .filter(|&new_size| new_size <= self.limit)
    }
}
