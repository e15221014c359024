//! tetplot - scatter and Q-Q plot computations from the command line
//!
//! Loads a delimited file, applies `--condition` filters, and prints plot
//! ranges, regression fits, Q-Q tables or scatter layouts as text or JSON.

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;

/// Log to stderr; `RUST_LOG` applies unless `-v` was given
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);
    commands::run(cli)
}
