#![allow(dead_code)]

use lazy_static::lazy_static;
use std::fs;
use std::path::{Path, PathBuf};

use plotrt::chart::ChartRenderer;
use plotrt::TimeSeries;

/// Header descriptions as written by Guppy, reads deliberately out of order
pub const GUPPY_DESCS: [&str; 4] = [
    "runid=9f2c1a read=118 ch=204 start_time=2021-05-01T10:00:00Z flow_cell_id=FAT12345 protocol_group_id=run1 sample_id=s1",
    "runid=9f2c1a read=12 ch=17 start_time=2021-05-01T09:00:00Z flow_cell_id=FAT12345 protocol_group_id=run1 sample_id=s1",
    "runid=9f2c1a read=57 ch=480 start_time=2021-05-01T09:30:00Z flow_cell_id=FAT12345 protocol_group_id=run1 sample_id=s1",
    "runid=9f2c1a read=58 ch=480 start_time=2021-05-01T09:30:00Z flow_cell_id=FAT12345 protocol_group_id=run1 sample_id=s1",
];

lazy_static! {
    pub static ref GUPPY_FASTQ: Vec<u8> = fastq_text(
        &GUPPY_DESCS
            .iter()
            .enumerate()
            .map(|(i, d)| (format!("read{}", i), d.to_string()))
            .collect::<Vec<_>>()
    );
}

/// Builds a FASTQ file from (id, description) pairs
pub fn fastq_text<S: AsRef<str>>(records: &[(S, S)]) -> Vec<u8> {
    let mut out = vec![];
    for (i, (id, desc)) in records.iter().enumerate() {
        let seq = "ACGT".repeat(i % 3 + 1);
        let qual = "I".repeat(seq.len());
        let (id, desc) = (id.as_ref(), desc.as_ref());
        let head = if desc.is_empty() {
            id.to_string()
        } else {
            format!("{} {}", id, desc)
        };
        out.extend_from_slice(format!("@{}\n{}\n+\n{}\n", head, seq, qual).as_bytes());
    }
    out
}

/// FASTQ with one read per timestamp, IDs `r0`, `r1`, ...
pub fn timed_fastq(times: &[&str]) -> Vec<u8> {
    let records: Vec<_> = times
        .iter()
        .enumerate()
        .map(|(i, t)| (format!("r{}", i), format!("runid=x start_time={}Z", t)))
        .collect();
    fastq_text(&records)
}

pub fn write_file(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Renderer that records its input and writes a placeholder file
#[derive(Default)]
pub struct RecordingChart {
    pub calls: Vec<(PathBuf, TimeSeries)>,
}

impl ChartRenderer for RecordingChart {
    fn extension(&self) -> &str {
        "png"
    }

    fn render(&mut self, series: &TimeSeries, path: &Path) -> plotrt::Result<()> {
        fs::write(path, format!("{} reads", series.len())).unwrap();
        self.calls.push((path.to_owned(), series.clone()));
        Ok(())
    }
}

pub fn sorted_dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

macro_rules! assert_approx {
    ($left:expr, $right:expr) => {
        let (l, r): (&[f64], &[f64]) = (&$left, &$right);
        assert_eq!(l.len(), r.len(), "length mismatch");
        for (a, b) in l.iter().zip(r) {
            assert!((a - b).abs() < 1e-9, "{:?} != {:?}", l, r);
        }
    };
}
