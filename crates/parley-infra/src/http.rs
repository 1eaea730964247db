//! Shared HTTP plumbing for the upstream clients.

use std::time::Duration;

use parley_types::error::BackendError;

/// User-Agent sent upstream unless configured otherwise.
pub const DEFAULT_USER_AGENT: &str = concat!("parley/", env!("CARGO_PKG_VERSION"));

/// Build the per-backend `reqwest` client.
pub fn build_client(timeout: Duration, user_agent: Option<&str>) -> Result<reqwest::Client, BackendError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
        .build()
        .map_err(|e| BackendError::InvalidConfig(format!("failed to create HTTP client: {e}")))
}

/// Join a base URL and a relative path with exactly one slash between them.
pub fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Map a transport failure (connect, timeout, body read) to an upstream error.
pub fn transport_error(e: reqwest::Error) -> BackendError {
    BackendError::Upstream {
        message: format!("HTTP request failed: {e}"),
    }
}

/// Pass successful responses through; turn everything else into an error.
pub async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    Err(match status.as_u16() {
        401 | 403 => BackendError::AuthenticationFailed,
        _ => BackendError::Upstream {
            message: format!("HTTP {status}: {error_body}"),
        },
    })
}
