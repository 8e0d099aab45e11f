//! Command-line parsing for the sales report generator.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! analysis code. Every `run` flag can also come from the environment (or a
//! `.env` file loaded before parsing).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_ALPHA, DEFAULT_PREVIEW_ROWS};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sales", version, about = "Descriptive statistics reports for sales transactions")]
pub struct Cli {
    /// Log filter (e.g. `info`, `debug`, `sales_insights=trace`).
    #[arg(long, global = true, env = "SALES_LOG", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze a sales CSV and write CSV reports, SVG charts and `summary.json`.
    Run(RunArgs),
    /// Write a synthetic beverage-sales CSV in the input schema.
    Generate(GenerateArgs),
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Sales transactions CSV.
    #[arg(short = 'i', long, env = "SALES_INPUT")]
    pub input: PathBuf,

    /// Directory for reports (created if missing; files are overwritten).
    #[arg(short = 'o', long, env = "SALES_OUT_DIR", default_value = "reports")]
    pub out_dir: PathBuf,

    /// Year used by the loyalty segmentation (default: latest year in the data).
    #[arg(short = 'y', long, env = "SALES_TARGET_YEAR")]
    pub year: Option<i32>,

    /// Significance level for the discount t-tests.
    #[arg(long, default_value_t = DEFAULT_ALPHA)]
    pub alpha: f64,

    /// Rows printed per table on the console (0 disables the preview).
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    pub preview: usize,

    /// Skip chart rendering.
    #[arg(long)]
    pub no_charts: bool,
}

#[derive(Debug, Args, Clone)]
pub struct GenerateArgs {
    /// Number of line items to write.
    #[arg(short = 'n', long, default_value_t = 5_000)]
    pub rows: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Years to spread orders over.
    #[arg(long, value_delimiter = ',', default_value = "2021,2022,2023")]
    pub years: Vec<i32>,

    /// Number of distinct customers.
    #[arg(long, default_value_t = 400)]
    pub customers: usize,

    /// Output CSV path.
    #[arg(short = 'o', long, default_value = "sales_data.csv")]
    pub out: PathBuf,
}
