//! Retry with exponential backoff for upstream forecast calls.
//!
//! Retried: timeouts, connection failures, 5xx, 429 and 408.
//! Everything else (other 4xx, request-building errors) fails immediately.

use std::future::Future;
use std::time::Duration;

use reqwest::{Response, StatusCode};

use crate::config::WeatherConfig;

const MAX_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            max_delay,
        }
    }

    pub fn from_config(cfg: &WeatherConfig) -> Self {
        Self::new(
            cfg.max_attempts,
            Duration::from_millis(cfg.backoff_ms),
            MAX_DELAY,
        )
    }

    /// Delay before retry number `retry` (0-based).
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    NoRetry,
}

pub fn classify_error(error: &reqwest::Error) -> RetryDecision {
    if error.is_timeout() || error.is_connect() {
        return RetryDecision::Retry;
    }
    if error.is_request() || error.is_builder() {
        return RetryDecision::NoRetry;
    }
    error
        .status()
        .map(classify_status)
        .unwrap_or(RetryDecision::NoRetry)
}

pub fn classify_status(status: StatusCode) -> RetryDecision {
    if status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
    {
        RetryDecision::Retry
    } else {
        RetryDecision::NoRetry
    }
}

/// Runs `operation` until it yields a non-retryable outcome or attempts run out.
///
/// On exhaustion the last response (possibly a 5xx) or error is returned as is,
/// leaving the status check to the caller.
pub async fn with_retry<F, Fut>(
    policy: &RetryPolicy,
    operation: F,
) -> Result<Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Response, reqwest::Error>>,
{
    let mut attempt = 1;
    loop {
        let last = attempt >= policy.max_attempts;

        match operation().await {
            Ok(response) => {
                let status = response.status();
                if last || classify_status(status) == RetryDecision::NoRetry {
                    if attempt > 1 {
                        tracing::info!(%status, attempt, "upstream answered after retries");
                    }
                    return Ok(response);
                }
                tracing::warn!(%status, attempt, max = policy.max_attempts, "retryable upstream status");
            }
            Err(e) => {
                if last || classify_error(&e) == RetryDecision::NoRetry {
                    tracing::warn!(error = %e, attempt, "upstream request failed");
                    return Err(e);
                }
                tracing::warn!(error = %e, attempt, max = policy.max_attempts, "retryable upstream error");
            }
        }

        tokio::time::sleep(policy.delay_for_retry(attempt - 1)).await;
        attempt += 1;
    }
}
