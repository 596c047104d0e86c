//! HTTP layer
//!
//! Rate-limited client used for both the old and new endpoints.

mod client;
mod rate_limit;

pub use client::{ApiClient, CallError, CallOutcome};
pub use rate_limit::RateLimiter;
