//! Data models for API diff runs
//!
//! This module contains the data structures shared across the pipeline:
//! parameter values, test cases, per-case report rows, and the run report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Concrete value of a test parameter.
///
/// Deserialized untagged so YAML scalars keep their type: `values: [1, 2]`
/// yields integers, `value: eu` a string. CSV cells always resolve to
/// `Str`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    /// Convert to a JSON value for request bodies.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ParamValue::Int(i) => serde_json::Value::from(*i),
            ParamValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(f.to_string())),
            ParamValue::Str(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::Float(x) => write!(f, "{x}"),
            ParamValue::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        ParamValue::Int(i)
    }
}

/// One concrete combination of parameter values.
///
/// The parameter order is the order the parameters appear in the
/// configuration. Cases are immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    params: Vec<(String, ParamValue)>,
}

impl TestCase {
    /// Create a case from ordered (name, value) pairs.
    pub fn new(params: Vec<(String, ParamValue)>) -> Self {
        Self { params }
    }

    /// Case with no parameters.
    pub fn empty() -> Self {
        Self { params: Vec::new() }
    }

    /// Look up a parameter value by name.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Iterate over (name, value) pairs in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &(String, ParamValue)> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Short label for log lines: the values joined with `-`.
    pub fn label(&self) -> String {
        if self.params.is_empty() {
            return "(no params)".to_string();
        }
        self.params
            .iter()
            .map(|(_, v)| v.to_string())
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Outcome of comparing one case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Match,
    Mismatch,
    Error,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Match => "match",
            CaseStatus::Mismatch => "mismatch",
            CaseStatus::Error => "error",
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, CaseStatus::Match)
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the final report.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaseRow {
    /// The case this row describes.
    pub case: TestCase,

    /// Comparison outcome.
    pub status: CaseStatus,

    /// Whether either response carried non-empty data.
    pub has_data: bool,

    /// Rendered diff entries, or the error detail for error rows.
    pub detail: String,

    /// Raw old response body, when raw capture is enabled.
    pub old_raw: Option<String>,

    /// Raw new response body, when raw capture is enabled.
    pub new_raw: Option<String>,
}

/// Result of one full run, written to the report exactly once.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the last case finished.
    pub completed_at: DateTime<Utc>,

    /// Parameter names in configuration order, for the header row.
    pub param_names: Vec<String>,

    /// Whether raw body columns are included.
    pub include_raw: bool,

    /// One row per case, in case order.
    pub rows: Vec<CaseRow>,
}

impl RunReport {
    pub fn matches(&self) -> usize {
        self.count(CaseStatus::Match)
    }

    pub fn mismatches(&self) -> usize {
        self.count(CaseStatus::Mismatch)
    }

    pub fn errors(&self) -> usize {
        self.count(CaseStatus::Error)
    }

    fn count(&self, status: CaseStatus) -> usize {
        self.rows.iter().filter(|r| r.status == status).count()
    }
}

/// Check whether a JSON value is empty-ish: null, `{}`, `[]`, `""`, `0`,
/// or `false`.
pub fn is_empty_json(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Bool(b) => !b,
        serde_json::Value::Number(n) => n.as_f64() == Some(0.0),
        serde_json::Value::String(s) => s.is_empty(),
        serde_json::Value::Array(a) => a.is_empty(),
        serde_json::Value::Object(o) => o.is_empty(),
    }
}
