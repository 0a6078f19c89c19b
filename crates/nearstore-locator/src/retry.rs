//! Retry policy for backend store API calls.
//!
//! Connection failures, timeouts, 5xx and `429 Too Many Requests` are
//! transient. A wait named by the server in `Retry-After` is used as given
//! (capped at [`MAX_DELAY`]); otherwise retry `n` waits
//! `backoff_base * 2^(n-1)` with ±25 % jitter.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;

use crate::error::ApiError;

const MAX_DELAY: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy)]
pub(crate) struct RetryPolicy {
    max_retries: u32,
    backoff_base: Duration,
}

impl RetryPolicy {
    pub(crate) fn new(max_retries: u32, backoff_base_ms: u64) -> Self {
        Self {
            max_retries,
            backoff_base: Duration::from_millis(backoff_base_ms),
        }
    }

    /// Wait before retry number `retry` (1-based) following `err`, or `None`
    /// when the call should give up.
    pub(crate) fn delay_before(&self, retry: u32, err: &ApiError) -> Option<Duration> {
        if retry == 0 || retry > self.max_retries || !is_transient(err) {
            return None;
        }
        if let Some(wait) = err.retry_after() {
            return Some(wait.min(MAX_DELAY));
        }
        let exponential = self
            .backoff_base
            .saturating_mul(1u32 << (retry - 1).min(10))
            .min(MAX_DELAY);
        Some(exponential.mul_f64(rand::random_range(0.75..=1.25)))
    }

    /// Run `operation` until it succeeds or [`Self::delay_before`] gives up.
    pub(crate) async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut retry = 0u32;
        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            retry += 1;
            let Some(delay) = self.delay_before(retry, &err) else {
                return Err(err);
            };
            tracing::warn!(
                retry,
                max_retries = self.max_retries,
                delay = ?delay,
                server_requested = err.retry_after().is_some(),
                error = %err,
                "store API call failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

fn is_transient(err: &ApiError) -> bool {
    match err {
        ApiError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        ApiError::UnexpectedStatus { status, .. } => {
            *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || (500..600).contains(status)
        }
        ApiError::NotFound { .. } | ApiError::Deserialize { .. } | ApiError::InvalidBaseUrl { .. } => {
            false
        }
    }
}

/// Parse a `Retry-After` value given in delta-seconds. HTTP-date values are
/// not honoured and fall back to the computed back-off.
pub(crate) fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
