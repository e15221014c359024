//! Argument parsing for the tetplot binary

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tetplot_stats::JitterMode;

#[derive(Parser, Debug)]
#[command(name = "tetplot")]
#[command(version)]
#[command(about = "Scatter and Q-Q plot computations over delimited data", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Settings file (defaults to the user config directory)
    #[arg(global = true, long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Output format
    #[arg(global = true, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(global = true, short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Input file and row selection shared by every subcommand
#[derive(Args, Debug)]
pub struct DataOpts {
    /// Delimited data file with a header row (.tsv is tab-separated)
    pub file: PathBuf,

    /// Load a numeric column as discrete
    #[arg(long, value_name = "COLUMN")]
    pub discrete: Vec<String>,

    /// Keep rows where VAR is in [LOW, HIGH], equals a category, is
    /// "above"/"below" its mean, or falls in n-tile bucket "K/N"
    #[arg(short, long, value_name = "VAR=VALUE", value_parser = parse_condition)]
    pub condition: Vec<(String, String)>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the plot range of continuous columns
    Range {
        #[command(flatten)]
        data: DataOpts,

        /// Columns to report (all continuous columns when omitted)
        #[arg(long = "column", value_name = "NAME")]
        columns: Vec<String>,
    },

    /// Fit a least-squares line of Y on X
    Regress {
        #[command(flatten)]
        data: DataOpts,

        #[arg(short, long)]
        x: String,

        #[arg(short, long)]
        y: String,
    },

    /// Compare a column against its fitted normal
    Qq {
        #[command(flatten)]
        data: DataOpts,

        /// Column to plot
        variable: String,

        /// Also lay the plot out in the settings frame
        #[arg(long)]
        layout: bool,
    },

    /// Lay out a scatter plot of Y against X
    Scatter {
        #[command(flatten)]
        data: DataOpts,

        /// X variable (first continuous column when omitted)
        #[arg(short, long)]
        x: Option<String>,

        /// Y variable (second continuous column when omitted)
        #[arg(short, long)]
        y: Option<String>,

        /// Draw the regression line
        #[arg(long)]
        line: bool,

        /// Override the jitter mode
        #[arg(long, value_parser = parse_jitter)]
        jitter: Option<JitterMode>,

        /// Seed for reproducible jitter
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Split `VAR=VALUE`
pub fn parse_condition(s: &str) -> Result<(String, String), String> {
    let (variable, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected VAR=VALUE, got '{}'", s))?;
    let variable = variable.trim();
    let value = value.trim();
    if variable.is_empty() || value.is_empty() {
        return Err(format!("expected VAR=VALUE, got '{}'", s));
    }
    Ok((variable.to_string(), value.to_string()))
}

fn parse_jitter(s: &str) -> Result<JitterMode, String> {
    s.parse()
}
