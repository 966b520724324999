//! Shared pieces of the blocking `reqwest` transport used by the cloud sink.

use std::time::Duration;

use reqwest::blocking::{Client, Response};

use crate::error::LogError;

/// Bound on a metadata server round trip; off-cloud the server is usually
/// unreachable and the lookup must fail fast.
pub const METADATA_TIMEOUT: Duration = Duration::from_secs(2);

/// Bound on one `entries:write` request.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for plain-HTTP calls to the metadata server. Proxies are bypassed:
/// the server is link-local.
///
/// # Errors
///
/// [`LogError::Transport`] if the client cannot be built.
pub fn metadata_client(timeout: Duration) -> Result<Client, LogError> {
    Ok(Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout)
        .no_proxy()
        .build()?)
}

/// Turns a non-2xx response into [`LogError::Http`], keeping the body text.
///
/// # Errors
///
/// [`LogError::Http`] carrying the status and the body.
pub fn error_for_status(resp: Response) -> Result<Response, LogError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(LogError::Http {
        status: status.as_u16(),
        body,
    })
}
