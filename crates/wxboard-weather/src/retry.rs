//! Backoff for forecast and geocoding requests.
//!
//! Timeouts, connect failures, 5xx, 408 and 429 are tried again. Any other
//! 4xx and errors raised while building the request are returned at once.

use std::future::Future;
use std::time::Duration;

use reqwest::{Response, StatusCode};

/// How often and how patiently a request is repeated.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Extra attempts after the first one
    pub max_retries: u32,
    /// Wait before the first retry; doubled for each further one
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(3, 100, 5000)
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, initial_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::from_millis(initial_delay_ms),
            max_delay: Duration::from_millis(max_delay_ms),
        }
    }

    /// One attempt only
    pub fn none() -> Self {
        Self::new(0, 0, 0)
    }

    /// Wait before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let doublings = retry.saturating_sub(1).min(31);
        self.initial_delay
            .saturating_mul(1u32 << doublings)
            .min(self.max_delay)
    }
}

fn worth_retrying_status(status: StatusCode) -> bool {
    status.is_server_error()
        || matches!(
            status,
            StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS
        )
}

fn worth_retrying_error(error: &reqwest::Error) -> bool {
    if error.is_timeout() || error.is_connect() {
        return true;
    }
    !error.is_request() && error.status().is_some_and(worth_retrying_status)
}

/// Send a request built by `send`, repeating it per `config`.
///
/// Yields the first response that is either successful or not worth
/// retrying. Once attempts run out the last response or transport error is
/// returned as is, so callers still see the real status.
pub async fn with_retry<F, Fut>(config: &RetryConfig, send: F) -> Result<Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Response, reqwest::Error>>,
{
    let mut retry = 0;

    loop {
        let result = send().await;
        let out_of_attempts = retry >= config.max_retries;

        let again = match &result {
            Ok(response) => worth_retrying_status(response.status()),
            Err(e) => worth_retrying_error(e),
        };

        if !again || out_of_attempts {
            if again && retry > 0 {
                tracing::warn!("Giving up after {} attempts", retry + 1);
            }
            return result;
        }

        retry += 1;
        let wait = config.backoff(retry);
        match &result {
            Ok(response) => tracing::warn!(
                "Status {}, retry {}/{} in {:?}",
                response.status(),
                retry,
                config.max_retries,
                wait
            ),
            Err(e) => tracing::warn!(
                "{}, retry {}/{} in {:?}",
                e,
                retry,
                config.max_retries,
                wait
            ),
        }
        tokio::time::sleep(wait).await;
    }
}
