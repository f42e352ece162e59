//! Shared HTTP plumbing for the provider adapters: error mapping and the
//! provider-level retry loop.

use reqwest::{Client, Response, StatusCode};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::AIError;

pub(crate) fn build_client(timeout: Duration) -> Result<Client, AIError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AIError::unavailable(format!("Failed to create HTTP client: {}", e)))
}

pub(crate) fn send_error(err: reqwest::Error, timeout: Duration) -> AIError {
    if err.is_timeout() {
        AIError::Timeout {
            timeout_secs: u32::try_from(timeout.as_secs()).unwrap_or(u32::MAX),
        }
    } else if err.is_connect() {
        AIError::network(format!("Connection failed: {}", err))
    } else {
        AIError::network(err.to_string())
    }
}

/// Passes successful responses through and maps the rest to `AIError`.
///
/// `context_markers` are body substrings that identify a context-length 400.
pub(crate) async fn check_status(
    response: Response,
    context_markers: &[&str],
    default_retry_after: u32,
) -> Result<Response, AIError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body, context_markers, default_retry_after))
}

pub(crate) fn status_error(
    status: StatusCode,
    body: &str,
    context_markers: &[&str],
    default_retry_after: u32,
) -> AIError {
    match status.as_u16() {
        401 | 403 => AIError::AuthenticationFailed,
        429 => AIError::rate_limited(parse_retry_after(body).unwrap_or(default_retry_after)),
        400 if context_markers.iter().any(|m| body.contains(m)) => AIError::context_too_long(0, 0),
        400 => AIError::InvalidRequest(body.to_string()),
        500..=599 => AIError::unavailable(format!("Server error {}: {}", status, body)),
        _ => AIError::network(format!("Unexpected status {}: {}", status, body)),
    }
}

/// Reads "try again in Ns" out of a JSON error message.
pub(crate) fn parse_retry_after(body: &str) -> Option<u32> {
    let parsed: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = parsed.get("error")?.get("message")?.as_str()?;
    let idx = message.find("try again in ")?;
    let rest = &message[idx + "try again in ".len()..];
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Runs `op` up to `max_retries + 1` times, backing off exponentially
/// (`base`, 2x`base`, 4x`base`, ...) while the error is retryable.
pub(crate) async fn with_retries<T, F, Fut>(
    provider: &str,
    max_retries: u32,
    base: Duration,
    mut op: F,
) -> Result<T, AIError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AIError>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < max_retries => {
                let delay = base * 2u32.saturating_pow(attempt);
                tracing::warn!(
                    provider,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Retrying provider call"
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
