//! CLI argument parsing
//!
//! Defines the command-line interface using clap.

use clap::Parser;
use std::path::PathBuf;

/// API response comparison tool
#[derive(Parser, Debug)]
#[command(name = "api-diff")]
#[command(version)]
#[command(about = "Compare JSON responses between old and new API endpoints")]
pub struct Args {
    /// Path to the YAML config file (see config/api_diff_config_SAMPLE.yaml)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Path to the output Excel file
    #[arg(short, long, default_value = "output/api_diff.xlsx")]
    pub output: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["api-diff", "--config", "config/run.yaml", "--debug"]);
        assert_eq!(args.config, PathBuf::from("config/run.yaml"));
        assert_eq!(args.output, PathBuf::from("output/api_diff.xlsx"));
        assert!(args.debug);
    }

    #[test]
    fn test_output_override() {
        let args = Args::parse_from([
            "api-diff",
            "--config",
            "run.yaml",
            "--output",
            "reports/run.xlsx",
        ]);
        assert_eq!(args.output, PathBuf::from("reports/run.xlsx"));
        assert!(!args.debug);
    }

    #[test]
    fn test_config_is_required() {
        assert!(Args::try_parse_from(["api-diff"]).is_err());
    }
}
