//! CLI entry point for running configured pipelines over CSV files.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use datamill::{Bundle, BundleConfig, Registry};
use polars::prelude::*;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Declarative data transformation pipelines",
    long_about = "Builds a transformation pipeline from a JSON configuration and runs it\n\
                  over a CSV file.\n\n\
                  EXAMPLES:\n  \
                  # Run a pipeline and write the transformed frame\n  \
                  datamill -c pipeline.json -i data.csv -o out.csv\n\n  \
                  # Validate a configuration without processing\n  \
                  datamill -c pipeline.json -i data.csv --dry-run"
)]
struct Args {
    /// Path to the JSON pipeline configuration
    #[arg(short, long)]
    config: PathBuf,

    /// Path to the CSV file to process
    #[arg(short, long)]
    input: PathBuf,

    /// Output CSV path; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Build the pipeline and list its units without processing
    #[arg(long)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_csv(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("failed to open {}", path.display()))?
        .finish()
        .with_context(|| format!("failed to parse {}", path.display()))
}

fn write_csv(df: &mut DataFrame, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            CsvWriter::new(file).finish(df)?;
            info!("Wrote {} rows to {}", df.height(), path.display());
        }
        None => {
            CsvWriter::new(std::io::stdout().lock()).finish(df)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet);

    if !args.input.exists() {
        return Err(anyhow!("Input file not found: {}", args.input.display()));
    }

    let config = BundleConfig::from_json_file(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;

    let registry = Registry::with_builtins();
    let mut bundle = Bundle::from_config(&registry, &config)?;

    if args.dry_run {
        println!("Configuration is valid.");
        match bundle.pipeline() {
            Some(pipeline) => {
                println!("Pipeline has {} top-level unit(s):", pipeline.len());
                for unit in pipeline.units() {
                    println!("  - {}", unit.name());
                }
            }
            None => println!("No pipeline configured."),
        }
        if let Some(model) = bundle.model() {
            println!("Model reference: {}", model.path().display());
        }
        return Ok(());
    }

    info!("Loading dataset from: {}", args.input.display());
    let data = load_csv(&args.input)?;
    info!("Dataset loaded: {:?}", data.shape());

    let mut out = bundle.run(data)?;
    info!("Pipeline finished: {:?}", out.shape());

    write_csv(&mut out, args.output.as_deref())
}
