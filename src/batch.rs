//! Running the pipeline for many input files
//!
//! Inputs are either FASTQ files or directories, which are searched recursively
//! for files ending in `.fastq`. All plots go to a new directory; if it exists
//! already, nothing is done. Files are processed one after another and the first
//! error stops the run. Plots written up to that point are kept.

use std::env;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::chart::ChartRenderer;
use crate::series::TimeSeries;
use crate::timestamp::{sort_reads, TimestampFormat};
use crate::{read, Error, Result};

const FASTQ_EXT: &str = "fastq";

/// What to plot and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// FASTQ files and/or directories to search
    pub input_files: Vec<PathBuf>,
    /// New directory for the plots, relative to the working directory
    pub out_dir: PathBuf,
}

impl Config {
    pub fn new<P: Into<PathBuf>>(input_files: Vec<PathBuf>, out_dir: P) -> Config {
        Config {
            input_files,
            out_dir: out_dir.into(),
        }
    }
}

/// One input file and the name of its plot (without extension)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub input: PathBuf,
    pub name: String,
}

impl Job {
    fn from_path(input: PathBuf) -> Job {
        let name = input
            .file_stem()
            .unwrap_or_else(|| input.as_os_str())
            .to_string_lossy()
            .into_owned();
        Job { input, name }
    }
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct Summary {
    /// Plots written, in processing order
    pub files: Vec<PathBuf>,
    /// Reads plotted over all files
    pub reads: u64,
    pub elapsed: Duration,
}

/// Plots every input file of `config` with `renderer`, using the default
/// (Guppy) timestamp format.
pub fn run<C: ChartRenderer>(config: &Config, renderer: &mut C) -> Result<Summary> {
    run_with_format(config, &TimestampFormat::default(), renderer)
}

pub fn run_with_format<C: ChartRenderer>(
    config: &Config,
    format: &TimestampFormat,
    renderer: &mut C,
) -> Result<Summary> {
    let start = Instant::now();
    let out_path = create_out_dir(&config.out_dir)?;
    let jobs = resolve_inputs(&config.input_files)?;
    info!(files = jobs.len(), out_dir = %out_path.display(), "plotting");

    let mut summary = Summary {
        files: Vec::with_capacity(jobs.len()),
        reads: 0,
        elapsed: Duration::default(),
    };
    for job in &jobs {
        let output = out_path.join(format!("{}.{}", job.name, renderer.extension()));
        if summary.files.contains(&output) {
            warn!(input = %job.input.display(), output = %output.display(), "overwriting plot of another input with the same name");
        }
        let series = plot_file(&job.input, &output, format, renderer)?;
        summary.reads += series.total_reads();
        summary.files.push(output);
    }
    summary.elapsed = start.elapsed();
    Ok(summary)
}

/// Loads, sorts and plots a single FASTQ file.
pub fn plot_file<C: ChartRenderer>(
    input: &Path,
    output: &Path,
    format: &TimestampFormat,
    renderer: &mut C,
) -> Result<TimeSeries> {
    let reads = read::load(input)?;
    let sorted = sort_reads(reads, format).map_err(|e| e.in_file(input))?;
    if let Some((first, last)) = sorted.span() {
        debug!(input = %input.display(), %first, %last, "run span");
    }
    let series = TimeSeries::from_sorted(&sorted);
    renderer.render(&series, output)?;
    info!(
        input = %input.display(),
        output = %output.display(),
        reads = series.total_reads(),
        hours = series.total_hours(),
        "plot written"
    );
    Ok(series)
}

/// Creates the output directory below the working directory. Fails if it
/// already exists.
pub fn create_out_dir(out_dir: &Path) -> Result<PathBuf> {
    let cwd = env::current_dir().map_err(|e| Error::io(".", e))?;
    let path = cwd.join(out_dir);
    match fs::create_dir(&path) {
        Ok(()) => Ok(path),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(Error::OutputExists(path)),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Turns input specifiers into jobs. Directories are searched recursively,
/// their files are sorted by path.
pub fn resolve_inputs(inputs: &[PathBuf]) -> Result<Vec<Job>> {
    let mut jobs = vec![];
    for input in inputs {
        if input.is_dir() {
            let mut found = vec![];
            find_fastq(input, &mut found)?;
            found.sort();
            debug!(dir = %input.display(), files = found.len(), "searched directory");
            jobs.extend(found.into_iter().map(Job::from_path));
        } else if has_fastq_ext(input) {
            jobs.push(Job::from_path(input.clone()));
        } else {
            return Err(Error::InvalidInput(input.clone()));
        }
    }
    Ok(jobs)
}

fn find_fastq(dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        // does not follow symlinks, so links to directories are not searched
        let file_type = entry.file_type().map_err(|e| Error::io(&path, e))?;
        if file_type.is_dir() {
            find_fastq(&path, found)?;
        } else if file_type.is_symlink() && path.is_dir() {
            debug!(path = %path.display(), "skipping symlinked directory");
        } else if has_fastq_ext(&path) {
            found.push(path);
        }
    }
    Ok(())
}

fn has_fastq_ext(path: &Path) -> bool {
    path.extension() == Some(OsStr::new(FASTQ_EXT))
}
