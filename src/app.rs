//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - initializes logging
//! - runs the analysis pipeline into the file and console sinks
//! - writes the run manifest
//! - generates synthetic sample data

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, GenerateArgs, RunArgs};
use crate::data::{SampleConfig, generate_transactions};
use crate::domain::AnalysisConfig;
use crate::error::AppError;
use crate::io::manifest::{RunManifest, write_manifest};
use crate::io::sink::{ConsoleSink, DirectorySink, SinkSet};

pub mod pipeline;

const SUBCOMMANDS: [&str; 3] = ["run", "generate", "help"];
const GLOBAL_VALUE_FLAG: &str = "--log-level";

/// Entry point for the `sales` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // `sales` and `sales --input x.csv` behave like `sales run ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_logging(&cli.log_level)?;

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Generate(args) => handle_generate(args),
    }
}

fn init_logging(level: &str) -> Result<(), AppError> {
    let filter = EnvFilter::try_new(level)
        .map_err(|e| AppError::new(2, format!("Invalid log level '{level}': {e}")))?;
    // Logs go to stderr; stdout carries the table previews.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
    Ok(())
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = analysis_config_from_args(&args);
    config.validate()?;

    let mut files = DirectorySink::new(&config.out_dir)?;
    let mut console = ConsoleSink::new(config.preview_rows);
    let run = {
        let mut sinks = SinkSet::new().with(&mut files).with(&mut console);
        pipeline::run_from_file(&config, &mut sinks)?
    };

    let manifest = RunManifest::from_run(&config.input_path, config.alpha, &run, files.written());
    let manifest_path = write_manifest(files.dir(), &manifest)?;
    info!(
        artifacts = manifest.artifacts.len(),
        manifest = %manifest_path.display(),
        "run complete"
    );
    Ok(())
}

fn handle_generate(args: GenerateArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        rows: args.rows,
        seed: args.seed,
        years: args.years,
        customers: args.customers,
    };
    let transactions = generate_transactions(&config)?;
    crate::io::export::write_transactions_csv(&args.out, &transactions)?;
    info!(rows = transactions.len(), path = %args.out.display(), "wrote sample data");
    Ok(())
}

pub fn analysis_config_from_args(args: &RunArgs) -> AnalysisConfig {
    AnalysisConfig {
        target_year: args.year,
        alpha: args.alpha,
        preview_rows: args.preview,
        charts: !args.no_charts,
        ..AnalysisConfig::new(args.input.clone(), args.out_dir.clone())
    }
}

/// Rewrite argv so `sales` defaults to `sales run`.
///
/// Rules:
/// - `sales`                       -> `sales run`
/// - `sales --input x.csv ...`     -> `sales run --input x.csv ...`
/// - `sales --help/--version/-h`   -> unchanged (show top-level help/version)
/// - any argv naming a subcommand  -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    // Global flags may precede the subcommand; the first other token decides.
    let mut idx = 1;
    while let Some(arg) = argv.get(idx) {
        if arg == GLOBAL_VALUE_FLAG {
            idx += 2;
        } else if arg.strip_prefix(GLOBAL_VALUE_FLAG).is_some_and(|rest| rest.starts_with('=')) {
            idx += 1;
        } else {
            break;
        }
    }

    let Some(first) = argv.get(idx) else {
        let at = idx.min(argv.len());
        argv.insert(at, "run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(first.as_str(), "-h" | "--help" | "-V" | "--version");
    if is_top_level_help_or_version || SUBCOMMANDS.contains(&first.as_str()) {
        return argv;
    }

    if first.starts_with('-') {
        argv.insert(idx, "run".to_string());
    }
    argv
}
