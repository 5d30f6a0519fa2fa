//! FeatureLab CLI: turn raw OHLCV bars into a labeled feature table.
//!
//! Commands:
//! - `generate`: run the full pipeline and write the table (CSV or Parquet)
//! - `check`: validate an input file and report what `generate` would produce

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{prelude::*, EnvFilter};

use featurelab_core::domain::Label;
use featurelab_runner::config::DEFAULT_INPUT;
use featurelab_runner::{
    check_input, run_pipeline, InputReport, OutputFormat, PipelineConfig, PipelineSummary,
};

#[derive(Parser)]
#[command(
    name = "featurelab",
    about = "FeatureLab CLI: technical features and next-bar labels for crypto OHLCV data"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute features and labels and write the output table.
    Generate {
        /// Path to a TOML config file. Flags override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Raw OHLCV input (CSV, or Parquet by extension).
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output table path.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: csv or parquet. Inferred from --output when omitted.
        #[arg(long)]
        format: Option<OutputFormat>,

        /// Also write the run summary as JSON to this path.
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Append log output to this file as well as stdout.
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
    /// Validate an input file without writing anything.
    Check {
        /// Raw OHLCV input (CSV, or Parquet by extension).
        #[arg(long, default_value = DEFAULT_INPUT)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            config,
            input,
            output,
            format,
            summary,
            log_file,
        } => {
            let _guard = init_tracing(log_file.as_deref())?;
            let mut pipeline = match config {
                Some(path) => PipelineConfig::from_file(&path)?,
                None => PipelineConfig::default(),
            };
            if let Some(input) = input {
                pipeline.input = input;
            }
            if let Some(output) = output {
                pipeline.output = output;
            }
            if format.is_some() {
                pipeline.format = format;
            }
            if summary.is_some() {
                pipeline.summary = summary;
            }
            run_generate(&pipeline)
        }
        Commands::Check { input } => {
            let _guard = init_tracing(None)?;
            run_check(&input)
        }
    }
}

/// Install stdout logging, plus a non-blocking file layer when `log_file` is
/// set. The returned guard flushes the file on drop and must outlive the run.
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create log directory {parent:?}"))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {path:?}"))?;
            let (writer, guard) = non_blocking(file);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|err| anyhow!("failed to initialize tracing: {err}"))?;
    Ok(guard)
}

fn run_generate(config: &PipelineConfig) -> Result<()> {
    let output = run_pipeline(config).context("feature generation failed")?;
    print_summary(&output.summary);
    Ok(())
}

fn run_check(input: &Path) -> Result<()> {
    let report = check_input(input).context("input check failed")?;
    info!(path = %report.path.display(), bars = report.bars, "input is valid");
    print_report(&report);
    Ok(())
}

fn print_summary(summary: &PipelineSummary) {
    println!();
    println!("=== Feature Table ===");
    println!("Output:         {} ({})", summary.output_path.display(), summary.format);
    println!(
        "Range:          {} → {}",
        summary.first_open_time, summary.last_open_time
    );
    println!("Input rows:     {}", summary.input_rows);
    println!("Output rows:    {}", summary.output_rows);
    println!("Dropped:        {}", summary.rows_dropped);
    for (reason, count) in &summary.dropped_by_reason {
        println!("  {:<24}{count}", format!("{reason:?}"));
    }
    println!("Dataset hash:   {}", summary.dataset_hash);
    println!();
    println!("--- Label distribution ---");
    let total = summary.label_distribution.total().max(1) as f64;
    for label in Label::ALL {
        let count = summary.label_distribution.count(label);
        println!(
            "{:<5} ({}) {:>8}  {:>6.2}%",
            label.name(),
            label.code(),
            count,
            count as f64 / total * 100.0
        );
    }
}

fn print_report(report: &InputReport) {
    println!();
    println!("=== Input Check ===");
    println!("Input:          {}", report.path.display());
    println!("Bars:           {}", report.bars);
    println!(
        "Range:          {} → {}",
        report.first_open_time, report.last_open_time
    );
    println!("Expected rows:  {}", report.expected_rows);
    if report.bars < report.required_rows {
        println!(
            "Warning: at least {} bars are needed for one output row",
            report.required_rows
        );
    }
    println!("Dataset hash:   {}", report.dataset_hash);
}
