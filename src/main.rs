//! api-diff - API response comparison tool
//!
//! Compares JSON responses between an old and a new API endpoint across
//! configured test cases and writes the differences to an Excel report.
//!
//! ## Usage
//!
//! ```bash
//! # Run a comparison
//! api-diff --config config/api_diff_config.yaml
//!
//! # Custom output path and debug logging
//! api-diff --config config/run.yaml --output reports/run.xlsx --debug
//! ```
//!
//! The exit code is 0 when the run completes, even with per-case
//! mismatches or errors recorded in the report; configuration and report
//! I/O failures exit nonzero.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use api_diff::cli::Args;
use api_diff::config::DiffConfig;
use api_diff::report::write_report;
use api_diff::runner::DiffRunner;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    let config = DiffConfig::load(&args.config)?;
    info!(
        "Comparing {} against {}",
        config.old_api.url, config.new_api.url
    );

    let runner = DiffRunner::new(config)?;
    let report = runner.run().await?;

    write_report(&report, &args.output)?;

    info!(
        "Done: {} cases ({} match, {} mismatch, {} error) -> {}",
        report.rows.len(),
        report.matches(),
        report.mismatches(),
        report.errors(),
        args.output.display()
    );

    Ok(())
}
