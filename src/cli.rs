//! Command line interface

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use crate::batch::{self, Config};
use crate::chart::PngChart;
use crate::Error;

#[derive(Debug, Parser)]
#[command(name = "plotrt", version)]
#[command(
    about = "Sort reads in FASTQ files produced by Guppy basecalling by timestamp and plot \
             the number of reads against run time in hours. Plots are saved to a new \
             directory created in the current directory."
)]
pub struct Cli {
    /// FASTQ files (e.g. 'file1.fastq file2.fastq' or '*.fastq'), or a directory
    /// that is searched recursively for .fastq files
    #[arg(long = "input_files", short = 'i', num_args = 1.., value_name = "PATH")]
    pub input_files: Vec<PathBuf>,

    /// Name of the directory created to hold the plots, e.g. 'out_folder'
    #[arg(long = "out_dir", short = 'o', value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

impl Cli {
    /// Returns `None` if there is nothing to do
    pub fn into_config(self) -> std::result::Result<Option<Config>, Error> {
        if self.input_files.is_empty() {
            return Ok(None);
        }
        let out_dir = self.out_dir.ok_or(Error::MissingOutDir)?;
        Ok(Some(Config::new(self.input_files, out_dir)))
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let config = match cli.into_config()? {
        Some(config) => config,
        None => {
            debug!("no input files given, nothing to do");
            return Ok(());
        }
    };

    let summary = batch::run(&config, &mut PngChart::default())?;
    println!(
        "Process complete. Total processing time: {}",
        humantime::format_duration(summary.elapsed)
    );
    Ok(())
}
