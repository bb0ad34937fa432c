//! Client error types with transient/permanent classification for retry logic.

use thiserror::Error;

/// Errors returned by the feed and catalog clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The remote host could not be reached (DNS, connect, reset).
    #[error("remote unreachable: {0}")]
    Unreachable(String),

    /// The request exceeded its per-call timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Credentials were rejected (401/403).
    #[error("authentication failed: {0}")]
    AuthError(String),

    /// The remote asked us to slow down (429).
    #[error("rate limited by remote (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// The addressed resource does not exist (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("failed to parse response: {0}")]
    ParseError(String),

    /// The client was built from an unusable configuration.
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),

    /// A retried call failed on every attempt.
    #[error("{message}")]
    MaxRetriesExceeded { attempts: u32, message: String },
}

/// Result alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Network-level conditions that may clear up on their own.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::Unreachable(_) | ClientError::Timeout(_) | ClientError::RateLimited { .. }
        )
    }

    /// 5xx responses from the remote.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, ClientError::Http { status, .. } if *status >= 500)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(err.to_string())
        } else if err.is_connect() || err.is_request() {
            ClientError::Unreachable(err.to_string())
        } else if err.is_decode() {
            ClientError::ParseError(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::Http {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            ClientError::Unreachable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::ParseError(err.to_string())
    }
}
