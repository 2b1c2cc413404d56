//! Record source errors

use std::time::Duration;

use thiserror::Error;

/// Errors returned by a [`RecordSource`](crate::source::RecordSource).
///
/// The grid never sees these; the caller decides whether to retry and what
/// to show in place of the rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Connection failure, timeout, or other transport problem.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with an error status.
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    /// The backend throttled the request.
    #[error("rate limited")]
    RateLimited { retry_after: Option<Duration> },

    /// The query referenced something the backend does not know.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The source does not implement the requested operation.
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),
}

impl SourceError {
    /// Returns `true` if repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SourceError::Network(_) | SourceError::RateLimited { .. } => true,
            SourceError::Server { status, .. } => (500..600).contains(status),
            SourceError::InvalidQuery(_) | SourceError::Unsupported(_) => false,
        }
    }

    /// Returns the server-provided backoff hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            SourceError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}
