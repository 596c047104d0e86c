//! Run orchestration
//!
//! Drives the pipeline: resolve parameters, build cases, call both
//! endpoints per case, diff, and accumulate report rows. Configuration
//! failures abort before any network call; per-case call failures are
//! recorded as error rows and the run continues.

use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::cases::build_cases;
use crate::config::DiffConfig;
use crate::diff::diff;
use crate::http::{ApiClient, CallOutcome, RateLimiter};
use crate::models::{is_empty_json, CaseRow, CaseStatus, RunReport, TestCase};
use crate::params::resolve_all;

/// Sequential diff runner for one configuration.
pub struct DiffRunner {
    config: DiffConfig,
    client: ApiClient,
}

impl DiffRunner {
    /// Build the shared rate limiter and client from the configuration.
    pub fn new(config: DiffConfig) -> Result<Self> {
        let limiter = Arc::new(RateLimiter::from_settings(
            config.rate_limit_calls,
            config.rate_limit_period,
        ));
        let client = ApiClient::new(limiter, config.timeout_secs, config.include_raw)?;
        Ok(Self { config, client })
    }

    /// Execute the full run and return the report for writing.
    pub async fn run(&self) -> Result<RunReport> {
        let started_at = Utc::now();

        let resolved = resolve_all(&self.config.params, self.config.base_dir())?;
        let test_cases = build_cases(&resolved)?;
        info!("Total test cases: {}", test_cases.len());

        let mut rows = Vec::with_capacity(test_cases.len());
        for case in test_cases {
            let old = self.client.call(&self.config.old_api, &case).await;
            let new = self.client.call(&self.config.new_api, &case).await;

            let row = evaluate_case(case, old, new);
            match row.status {
                CaseStatus::Match => {
                    info!("{}: no diff, has_data={}", row.case.label(), row.has_data);
                }
                CaseStatus::Mismatch => {
                    info!("{}: {}", row.case.label(), row.detail.replace('\n', "; "));
                }
                CaseStatus::Error => {
                    info!("{}: error - {}", row.case.label(), row.detail);
                }
            }
            rows.push(row);
        }

        let report = RunReport {
            started_at,
            completed_at: Utc::now(),
            param_names: self.config.param_names(),
            include_raw: self.config.include_raw,
            rows,
        };

        info!(
            "Run complete: {} match, {} mismatch, {} error",
            report.matches(),
            report.mismatches(),
            report.errors()
        );

        Ok(report)
    }
}

/// Turn the two call outcomes for a case into a report row.
///
/// A diff is only attempted when both calls succeeded; otherwise the row
/// is an error row carrying the failure detail, old endpoint first.
pub fn evaluate_case(case: TestCase, old: CallOutcome, new: CallOutcome) -> CaseRow {
    match (old, new) {
        (
            CallOutcome::Success {
                body: old_body,
                raw: old_raw,
            },
            CallOutcome::Success {
                body: new_body,
                raw: new_raw,
            },
        ) => {
            let record = diff(&old_body, &new_body);
            let status = if record.is_match() {
                CaseStatus::Match
            } else {
                CaseStatus::Mismatch
            };
            CaseRow {
                case,
                status,
                has_data: !is_empty_json(&old_body) || !is_empty_json(&new_body),
                detail: record.render(),
                old_raw,
                new_raw,
            }
        }
        (old, new) => {
            let mut details = Vec::new();
            if let CallOutcome::Failed(e) = &old {
                details.push(format!("old: {e}"));
            }
            if let CallOutcome::Failed(e) = &new {
                details.push(format!("new: {e}"));
            }

            let old_raw = match old {
                CallOutcome::Success { raw, .. } => raw,
                CallOutcome::Failed(_) => None,
            };
            let new_raw = match new {
                CallOutcome::Success { raw, .. } => raw,
                CallOutcome::Failed(_) => None,
            };

            CaseRow {
                case,
                status: CaseStatus::Error,
                has_data: false,
                detail: details.join("; "),
                old_raw,
                new_raw,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::CallError;
    use crate::models::ParamValue;
    use serde_json::json;

    fn case(id: i64) -> TestCase {
        TestCase::new(vec![("user_id".to_string(), ParamValue::Int(id))])
    }

    fn success(body: serde_json::Value) -> CallOutcome {
        CallOutcome::Success { body, raw: None }
    }

    #[test]
    fn test_matching_bodies_yield_match_row() {
        let row = evaluate_case(
            case(1),
            success(json!({"name": "A"})),
            success(json!({"name": "A"})),
        );
        assert_eq!(row.status, CaseStatus::Match);
        assert!(row.has_data);
        assert!(row.detail.is_empty());
    }

    #[test]
    fn test_differing_bodies_yield_mismatch_row() {
        let row = evaluate_case(
            case(2),
            success(json!({"name": "A"})),
            success(json!({"name": "B"})),
        );
        assert_eq!(row.status, CaseStatus::Mismatch);
        assert_eq!(row.detail, "changed name: \"A\" -> \"B\"");
    }

    #[test]
    fn test_failed_old_call_yields_error_row() {
        let row = evaluate_case(
            case(3),
            CallOutcome::Failed(CallError::Timeout(10)),
            success(json!({"name": "A"})),
        );
        assert_eq!(row.status, CaseStatus::Error);
        assert!(!row.has_data);
        assert_eq!(row.detail, "old: timeout after 10 seconds");
    }

    #[test]
    fn test_both_failed_calls_report_old_first() {
        let row = evaluate_case(
            case(4),
            CallOutcome::Failed(CallError::Connect("http://old".to_string())),
            CallOutcome::Failed(CallError::Status {
                status: 500,
                detail: "boom".to_string(),
            }),
        );
        assert_eq!(row.status, CaseStatus::Error);
        assert_eq!(
            row.detail,
            "old: connection failed to http://old; new: unexpected status 500: boom"
        );
    }

    #[test]
    fn test_empty_bodies_have_no_data() {
        let row = evaluate_case(case(5), success(json!({})), success(json!({})));
        assert_eq!(row.status, CaseStatus::Match);
        assert!(!row.has_data);
    }

    #[test]
    fn test_example_scenario() {
        // user_id 1: both return {"name": "A"}; user_id 2: old A, new B.
        let rows = vec![
            evaluate_case(
                case(1),
                success(json!({"name": "A"})),
                success(json!({"name": "A"})),
            ),
            evaluate_case(
                case(2),
                success(json!({"name": "A"})),
                success(json!({"name": "B"})),
            ),
        ];

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].status, CaseStatus::Match);
        assert!(rows[0].detail.is_empty());
        assert_eq!(rows[1].status, CaseStatus::Mismatch);
        assert!(rows[1].detail.contains("name"));
    }
}
