//! API Diff - compare JSON responses between two API versions
//!
//! Builds a set of test cases from configured parameters (literals, lists,
//! or columns of external CSV files), calls an old and a new endpoint for
//! each case under a shared rate limit, computes structural JSON diffs,
//! and writes the results to an Excel report.
//!
//! Pipeline: [`params`] resolves parameter sources, [`cases`] combines
//! them into test cases (row-aligned per source file, cross product
//! otherwise), [`http`] issues the rate-limited calls, [`diff`] compares
//! the bodies, [`runner`] orchestrates, and [`report`] writes the
//! workbook.

pub mod cases;
pub mod cli;
pub mod config;
pub mod diff;
pub mod http;
pub mod models;
pub mod params;
pub mod report;
pub mod runner;

pub use config::{ConfigError, DiffConfig};
pub use models::{CaseRow, CaseStatus, RunReport, TestCase};
pub use runner::DiffRunner;
