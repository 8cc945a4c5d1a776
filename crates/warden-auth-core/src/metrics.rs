//! Verification metrics.
//!
//! - `warden_verifications_total` - Counter of verification outcomes
//! - `warden_jwks_fetches_total` - Counter of key-set fetches by result
//! - `warden_jwks_fetch_duration_seconds` - Histogram of key-set fetch latency
//!
//! Recording is a no-op until a `metrics` recorder is installed.

use metrics::{counter, histogram};

use crate::error::FailureKind;

/// Metric name for verification outcomes.
pub const VERIFICATIONS_TOTAL: &str = "warden_verifications_total";

/// Metric name for key-set fetches.
pub const JWKS_FETCHES_TOTAL: &str = "warden_jwks_fetches_total";

/// Metric name for key-set fetch duration.
pub const JWKS_FETCH_DURATION_SECONDS: &str = "warden_jwks_fetch_duration_seconds";

/// Result of a key-set fetch for metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchResult {
    Success,
    Error,
    Timeout,
}

impl FetchResult {
    /// Get the result as a string for metrics labels.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Timeout => "timeout",
        }
    }
}

/// Record the outcome of one verification. `None` means allowed.
pub fn record_verification(failure: Option<FailureKind>) {
    let outcome = failure.map_or("allowed", |kind| kind.as_str());
    counter!(VERIFICATIONS_TOTAL, "outcome" => outcome).increment(1);
}

/// Record a key-set fetch.
pub fn record_fetch(result: FetchResult, duration_seconds: f64) {
    counter!(JWKS_FETCHES_TOTAL, "result" => result.as_str()).increment(1);
    histogram!(JWKS_FETCH_DURATION_SECONDS).record(duration_seconds);
}
