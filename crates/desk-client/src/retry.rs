//! Retry policy for transient request failures.
//!
//! Kept as a standalone value so the backoff shape can be swapped (fixed,
//! exponential, none) without touching the executor loop.

use crate::ApiError;
use reqwest::Method;
use std::time::Duration;

/// Retry policy applied by [`crate::ApiClient::execute`].
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of extra attempts after the first (1 means up to two
    /// attempts total).
    pub max_retries: u32,
    /// Fixed delay before each retry.
    pub delay: Duration,
    /// Whether non-idempotent methods (POST, PATCH) are retried on transient
    /// failure. A 5xx can land after the server partially applied a write, so
    /// a deployment may prefer to turn this off.
    pub retry_non_idempotent: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            delay: Duration::from_millis(500),
            retry_non_idempotent: true,
        }
    }
}

impl RetryPolicy {
    /// Never retry.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Retry transient failures only on idempotent methods.
    pub fn idempotent_only() -> Self {
        Self {
            retry_non_idempotent: false,
            ..Self::default()
        }
    }

    /// Decide whether a failed attempt should be retried.
    ///
    /// Retryable: network-level failures (no status available) and server
    /// errors (5xx). Client errors (4xx) and decode failures never retry.
    pub fn should_retry(&self, method: &Method, error: &ApiError) -> bool {
        if !error.is_transient() {
            return false;
        }
        if !self.retry_non_idempotent && !is_idempotent(method) {
            return false;
        }
        true
    }

    /// Delay before the next attempt. Fixed, not exponential.
    pub fn backoff(&self) -> Duration {
        self.delay
    }
}

fn is_idempotent(method: &Method) -> bool {
    // PUT and DELETE are idempotent by HTTP semantics; POST and PATCH are not.
    !matches!(*method, Method::POST | Method::PATCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Payload;

    fn server_error() -> ApiError {
        ApiError::Status {
            status: 502,
            payload: Payload::Text("bad gateway".to_string()),
        }
    }

    fn client_error() -> ApiError {
        ApiError::Status {
            status: 400,
            payload: Payload::Text("bad request".to_string()),
        }
    }

    #[test]
    fn default_policy_retries_transient_failures_on_all_methods() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(&Method::GET, &server_error()));
        assert!(policy.should_retry(&Method::POST, &server_error()));
        assert!(policy.should_retry(&Method::GET, &ApiError::Network("refused".to_string())));
    }

    #[test]
    fn client_errors_never_retry() {
        let policy = RetryPolicy::default();
        assert!(!policy.should_retry(&Method::GET, &client_error()));
        assert!(!policy.should_retry(&Method::POST, &client_error()));
    }

    #[test]
    fn idempotent_only_skips_post_and_patch() {
        let policy = RetryPolicy::idempotent_only();
        assert!(!policy.should_retry(&Method::POST, &server_error()));
        assert!(!policy.should_retry(&Method::PATCH, &server_error()));
        assert!(policy.should_retry(&Method::GET, &server_error()));
        assert!(policy.should_retry(&Method::DELETE, &server_error()));
        assert!(policy.should_retry(&Method::PUT, &server_error()));
    }

    #[test]
    fn backoff_is_fixed() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(), Duration::from_millis(500));
        assert_eq!(policy.backoff(), Duration::from_millis(500));
    }
}
