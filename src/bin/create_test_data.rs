//! create-test-data - expand a config's parameter space into a CSV
//!
//! Generates the full set of test cases an api-diff run would execute and
//! writes them to a CSV file (header row of parameter names, one row per
//! case). Useful for reviewing or hand-editing the case set before
//! feeding it back in as a file-column source.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use api_diff::cases::build_cases;
use api_diff::config::DiffConfig;
use api_diff::params::resolve_all;

/// Test case CSV generator
#[derive(Parser, Debug)]
#[command(name = "create-test-data")]
#[command(version)]
#[command(about = "Generate a CSV of all test cases from an api-diff config")]
struct Args {
    /// Path to the YAML config file
    #[arg(short, long)]
    config: PathBuf,

    /// Path to the output CSV file
    #[arg(short, long, default_value = "config/test_data.csv")]
    output: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .compact()
        .init();

    let config = DiffConfig::load(&args.config)?;
    if config.params.is_empty() {
        info!("No parameters configured; nothing to generate");
        return Ok(());
    }

    let resolved = resolve_all(&config.params, config.base_dir())?;
    let cases = build_cases(&resolved)?;
    info!("Total combinations to generate: {}", cases.len());

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    writer.write_record(config.param_names())?;
    for case in &cases {
        writer.write_record(case.iter().map(|(_, value)| value.to_string()))?;
    }
    writer.flush()?;

    info!("CSV generated: {}", args.output.display());
    Ok(())
}
