//! Rate-limited API client
//!
//! Issues one request per (endpoint, case) pair and classifies failures
//! instead of propagating them, so the run can continue past bad cases.

use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::rate_limit::RateLimiter;
use crate::config::EndpointConfig;
use crate::models::{ParamValue, TestCase};

/// Per-call failures. These are recorded as "error" rows in the report
/// rather than aborting the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("timeout after {0} seconds")]
    Timeout(u64),

    #[error("connection failed to {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("unsupported content type '{0}', expected JSON")]
    ContentType(String),

    #[error("invalid JSON body: {0}")]
    Decode(String),
}

/// Result of calling one endpoint for one case.
#[derive(Clone, Debug)]
pub enum CallOutcome {
    Success {
        body: serde_json::Value,
        /// Raw response text, kept when raw capture is enabled.
        raw: Option<String>,
    },
    Failed(CallError),
}

impl CallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success { .. })
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&CallError> {
        match self {
            CallOutcome::Success { .. } => None,
            CallOutcome::Failed(e) => Some(e),
        }
    }
}

/// HTTP client shared by both endpoints.
pub struct ApiClient {
    client: Client,
    limiter: Arc<RateLimiter>,
    timeout_secs: u64,
    include_raw: bool,
}

impl ApiClient {
    /// Create a client with the shared limiter and per-request timeout.
    pub fn new(limiter: Arc<RateLimiter>, timeout_secs: u64, include_raw: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            limiter,
            timeout_secs,
            include_raw,
        })
    }

    /// Call an endpoint for one case. Never returns an error; failures
    /// are captured in the outcome.
    pub async fn call(&self, endpoint: &EndpointConfig, case: &TestCase) -> CallOutcome {
        self.limiter.acquire().await;

        match self.fetch(endpoint, case).await {
            Ok((body, raw)) => CallOutcome::Success {
                body,
                raw: self.include_raw.then_some(raw),
            },
            Err(e) => {
                debug!("call failed for case {}: {}", case.label(), e);
                CallOutcome::Failed(e)
            }
        }
    }

    async fn fetch(
        &self,
        endpoint: &EndpointConfig,
        case: &TestCase,
    ) -> Result<(serde_json::Value, String), CallError> {
        let method = endpoint
            .method()
            .map_err(|e| CallError::Request(e.to_string()))?;
        let (url, remaining) = substitute_url(&endpoint.url, case);

        debug!("{} {} ({})", method, url, case.label());

        let mut request = self.client.request(method.clone(), &url);
        for (key, value) in &endpoint.headers {
            request = request.header(key.as_str(), value.as_str());
        }

        // GET sends leftover params as the query string; other methods
        // send them as a JSON body (matching the old tool's contract).
        request = if method == Method::GET {
            let pairs: Vec<(String, String)> = remaining
                .iter()
                .map(|(name, value)| (name.clone(), value.to_string()))
                .collect();
            request.query(&pairs)
        } else {
            let body: serde_json::Map<String, serde_json::Value> = remaining
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect();
            request.json(&body)
        };

        let response = request
            .send()
            .await
            .map_err(|e| classify_send_error(e, &url, self.timeout_secs))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let text = response
            .text()
            .await
            .map_err(|e| CallError::Request(e.to_string()))?;

        debug!("Response: {} ({} bytes)", status.as_u16(), text.len());

        if !status.is_success() {
            return Err(CallError::Status {
                status: status.as_u16(),
                detail: snippet(&text),
            });
        }

        if !content_type.to_ascii_lowercase().contains("json") {
            return Err(CallError::ContentType(content_type));
        }

        let body = serde_json::from_str(&text).map_err(|e| CallError::Decode(e.to_string()))?;
        Ok((body, text))
    }
}

fn classify_send_error(err: reqwest::Error, url: &str, timeout_secs: u64) -> CallError {
    if err.is_timeout() {
        CallError::Timeout(timeout_secs)
    } else if err.is_connect() {
        CallError::Connect(url.to_string())
    } else {
        CallError::Request(err.to_string())
    }
}

/// Substitute `{name}` placeholders in the URL from the case; parameters
/// without a placeholder are returned for the query string or body.
fn substitute_url(url: &str, case: &TestCase) -> (String, Vec<(String, ParamValue)>) {
    let mut out = url.to_string();
    let mut remaining = Vec::new();

    for (name, value) in case.iter() {
        let placeholder = format!("{{{name}}}");
        if out.contains(&placeholder) {
            out = out.replace(&placeholder, &value.to_string());
        } else {
            remaining.push((name.clone(), value.clone()));
        }
    }

    (out, remaining)
}

/// First 200 characters of a body, for error detail.
fn snippet(text: &str) -> String {
    text.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case() -> TestCase {
        TestCase::new(vec![
            ("user_id".to_string(), ParamValue::Int(7)),
            ("region".to_string(), ParamValue::from("eu")),
        ])
    }

    #[test]
    fn test_substitute_url_replaces_placeholders() {
        let (url, remaining) = substitute_url("https://api.test/v1/users/{user_id}", &case());
        assert_eq!(url, "https://api.test/v1/users/7");
        assert_eq!(remaining, vec![("region".to_string(), ParamValue::from("eu"))]);
    }

    #[test]
    fn test_substitute_url_without_placeholders() {
        let (url, remaining) = substitute_url("https://api.test/v1/users", &case());
        assert_eq!(url, "https://api.test/v1/users");
        assert_eq!(remaining.len(), 2);
    }

    #[test]
    fn test_call_outcome_helpers() {
        let success = CallOutcome::Success {
            body: serde_json::json!({"a": 1}),
            raw: None,
        };
        assert!(success.is_success());
        assert!(success.error().is_none());

        let failed = CallOutcome::Failed(CallError::Timeout(10));
        assert!(!failed.is_success());
        assert_eq!(failed.error(), Some(&CallError::Timeout(10)));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CallError::ContentType("text/html".to_string()).to_string(),
            "unsupported content type 'text/html', expected JSON"
        );
        assert_eq!(
            CallError::Status {
                status: 503,
                detail: "busy".to_string()
            }
            .to_string(),
            "unexpected status 503: busy"
        );
    }

    #[test]
    fn test_snippet_truncates() {
        let long = "x".repeat(500);
        assert_eq!(snippet(&long).len(), 200);
        assert_eq!(snippet("short"), "short");
    }
}
