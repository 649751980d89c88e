//! Autolysis - Automated CSV analysis
//!
//! Loads a CSV file, computes descriptive statistics, renders diagnostic
//! charts and asks a chat model to write a README about the findings.

mod charts;
mod config;
mod data;
mod pipeline;
mod report;
mod stats;

use clap::error::ErrorKind;
use clap::Parser;
use config::ReportConfig;
use pipeline::{Pipeline, PipelineError};
use report::OpenAiClient;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: autolysis <dataset.csv>";

#[derive(Parser, Debug)]
#[command(name = "autolysis", version, about = "Automated CSV analysis with an LLM-written README")]
struct Cli {
    /// CSV file to analyze
    dataset: PathBuf,
}

/// Logs go to stderr; stdout carries only the progress messages.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), PipelineError> {
    // Pre-flight: no file is read or written without a credential.
    let config = ReportConfig::from_env()?;
    info!("model {} via {}", config.model, config.endpoint);

    let client = OpenAiClient::new(config)?;
    let outcome = Pipeline::new(client, ".").run(&cli.dataset)?;

    let (rows, cols) = outcome.analysis.shape;
    let charts = [
        &outcome.charts.missing_values,
        &outcome.charts.correlation_heatmap,
        &outcome.charts.distribution,
    ]
    .iter()
    .filter(|c| c.is_some())
    .count();
    info!(
        "done: {rows}x{cols} dataset, {charts} chart(s), report at {}",
        outcome.readme.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(_) => {
            println!("{USAGE}");
            return ExitCode::from(1);
        }
    };

    init_logging();
    dotenvy::dotenv().ok();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
