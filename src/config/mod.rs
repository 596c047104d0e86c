//! Configuration loading and validation
//!
//! The run is driven by a YAML document describing the two endpoints, the
//! rate limit, and the parameter specs. File-column parameter paths are
//! resolved relative to the config document's own directory.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::ParamValue;

/// Configuration errors. All of these are fatal and abort the run before
/// any network activity (except the source-file variants, raised during
/// parameter resolution, which still precede any HTTP call).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("parameter '{name}' must have exactly one of 'value', 'values', or 'file'+'column'")]
    ParamSource { name: String },

    #[error("parameter '{name}' needs both 'file' and 'column'")]
    IncompleteFileColumn { name: String },

    #[error("duplicate parameter name '{name}'")]
    DuplicateParam { name: String },

    #[error("invalid HTTP method '{method}'")]
    InvalidMethod { method: String },

    #[error("rate_limit_calls must be at least 1")]
    ZeroRateLimit,

    #[error("failed to read parameter source file {}: {source}", .path.display())]
    SourceFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse parameter source file {}: {source}", .path.display())]
    SourceCsv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("column '{column}' not found in {}", .path.display())]
    MissingColumn { column: String, path: PathBuf },

    #[error(
        "row-aligned parameters from {} have mismatched lengths ({left} vs {right})",
        .path.display()
    )]
    RowCountMismatch {
        path: PathBuf,
        left: usize,
        right: usize,
    },
}

/// One API endpoint: base URL, method, and headers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL. `{name}` placeholders are substituted from the case.
    pub url: String,

    /// HTTP method, default GET.
    #[serde(default = "default_method")]
    pub request_method: String,

    /// Headers attached to every request (auth tokens etc.).
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_method() -> String {
    "GET".to_string()
}

impl EndpointConfig {
    /// Parse the configured method.
    pub fn method(&self) -> Result<Method, ConfigError> {
        Method::from_bytes(self.request_method.to_uppercase().as_bytes()).map_err(|_| {
            ConfigError::InvalidMethod {
                method: self.request_method.clone(),
            }
        })
    }
}

/// Where a parameter's values come from.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamSource {
    /// Single literal value.
    Literal { value: ParamValue },
    /// Explicit list of values, order preserved.
    List { values: Vec<ParamValue> },
    /// A named column of an external CSV file, path relative to the
    /// config document.
    FileColumn { file: PathBuf, column: String },
}

/// A named parameter and its value source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawParamSpec")]
pub struct ParamSpec {
    pub name: String,
    #[serde(flatten)]
    pub source: ParamSource,
}

/// Mirror struct used to enforce the exactly-one-source invariant at
/// deserialization time.
#[derive(Deserialize)]
struct RawParamSpec {
    name: String,
    value: Option<ParamValue>,
    values: Option<Vec<ParamValue>>,
    file: Option<PathBuf>,
    column: Option<String>,
}

impl TryFrom<RawParamSpec> for ParamSpec {
    type Error = ConfigError;

    fn try_from(raw: RawParamSpec) -> Result<Self, Self::Error> {
        let has_file_parts = raw.file.is_some() || raw.column.is_some();
        let kinds =
            usize::from(raw.value.is_some()) + usize::from(raw.values.is_some()) + usize::from(has_file_parts);
        if kinds != 1 {
            return Err(ConfigError::ParamSource { name: raw.name });
        }

        let source = if let Some(value) = raw.value {
            ParamSource::Literal { value }
        } else if let Some(values) = raw.values {
            ParamSource::List { values }
        } else {
            match (raw.file, raw.column) {
                (Some(file), Some(column)) => ParamSource::FileColumn { file, column },
                _ => return Err(ConfigError::IncompleteFileColumn { name: raw.name }),
            }
        };

        Ok(ParamSpec {
            name: raw.name,
            source,
        })
    }
}

/// Full run configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiffConfig {
    /// The endpoint being replaced.
    pub old_api: EndpointConfig,

    /// The endpoint replacing it.
    pub new_api: EndpointConfig,

    /// Maximum calls per rate-limit window.
    #[serde(default = "default_rate_limit_calls")]
    pub rate_limit_calls: u32,

    /// Rate-limit window length in seconds.
    #[serde(default = "default_rate_limit_period")]
    pub rate_limit_period: f64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Capture raw response bodies into the report.
    #[serde(default)]
    pub include_raw: bool,

    /// Parameter specs, in report column order.
    #[serde(default)]
    pub params: Vec<ParamSpec>,

    /// Directory of the config document, for resolving relative paths.
    #[serde(skip)]
    base_dir: PathBuf,
}

fn default_rate_limit_calls() -> u32 {
    10
}

fn default_rate_limit_period() -> f64 {
    1.0
}

fn default_timeout_secs() -> u64 {
    10
}

impl DiffConfig {
    /// Load and validate configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
        Self::from_yaml(&content, base_dir).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse configuration from a YAML string with an explicit base
    /// directory for relative paths.
    pub fn from_yaml(content: &str, base_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let mut config: Self =
            serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
                path: PathBuf::new(),
                source,
            })?;
        config.base_dir = base_dir.into();
        config.validate()?;
        Ok(config)
    }

    /// Directory file-column paths are resolved against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Parameter names in config order.
    pub fn param_names(&self) -> Vec<String> {
        self.params.iter().map(|p| p.name.clone()).collect()
    }

    /// Validate cross-field invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.old_api.method()?;
        self.new_api.method()?;

        if self.rate_limit_calls == 0 {
            return Err(ConfigError::ZeroRateLimit);
        }

        let mut seen = std::collections::BTreeSet::new();
        for spec in &self.params {
            if !seen.insert(spec.name.as_str()) {
                return Err(ConfigError::DuplicateParam {
                    name: spec.name.clone(),
                });
            }
        }

        Ok(())
    }
}
