use clap::Parser;
use plotrt::cli::{self, Cli};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = cli::run(cli) {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}
