use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use std::time::Duration;

/// Backoff settings for `request_with_retry`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// No waiting between attempts. Used by tests against mock servers.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(60),
        }
    }
}

/// Retries a request closure with exponential backoff.
/// Retries on:
/// - Network errors
/// - 429 Too Many Requests (respects Retry-After header)
/// - 5xx Server Errors
///
/// Returns the last Response (even if error status) or the last network error.
pub async fn request_with_retry<F, Fut>(
    mut task: F,
    policy: RetryPolicy,
) -> Result<reqwest::Response, reqwest::Error>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut attempt = 0;
    let mut delay = policy.initial_delay;

    loop {
        attempt += 1;
        match task().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() || attempt > policy.max_retries {
                    return Ok(response);
                }

                if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                    let retry_delay = retry_delay(response.headers(), delay, policy.max_delay);

                    tracing::warn!(
                        %status,
                        ?retry_delay,
                        attempt,
                        max_retries = policy.max_retries,
                        "request failed, retrying"
                    );
                    tokio::time::sleep(retry_delay).await;
                    delay = std::cmp::min(delay * 2, policy.max_delay);
                    continue;
                }

                // 400, 401, 404 and friends are permanent
                return Ok(response);
            }
            Err(e) => {
                if attempt > policy.max_retries {
                    return Err(e);
                }
                tracing::warn!(
                    error = %e,
                    ?delay,
                    attempt,
                    max_retries = policy.max_retries,
                    "network error, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = std::cmp::min(delay * 2, policy.max_delay);
            }
        }
    }
}

/// Wait before the next attempt: `Retry-After` in whole seconds when the
/// server sends it, else `fallback`. Never longer than `max`.
fn retry_delay(headers: &HeaderMap, fallback: Duration, max: Duration) -> Duration {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(fallback)
        .min(max)
}

/// Whether an HTTP status means the credentials were rejected.
pub fn is_auth_status(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}
