//! Fetch error taxonomy.

use thiserror::Error;

/// Failure modes of one availability fetch.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The request did not complete within the configured timeout.
    #[error("availability request timed out")]
    Timeout,

    /// Connectivity-level failure (DNS, connect, TLS, reset).
    #[error("availability request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status and no envelope.
    #[error("availability service returned HTTP {status}")]
    Http { status: u16 },

    /// The response body was not parseable JSON.
    #[error("availability response was not valid JSON: {0}")]
    InvalidBody(String),

    /// No usable record ids were supplied for the request.
    #[error("no record ids to fetch")]
    EmptyRequest,

    /// The client could not be constructed (bad base URL, TLS setup).
    #[error("availability client configuration error: {0}")]
    Config(String),
}

impl FetchError {
    /// Whether a retry of the same request could plausibly succeed.
    ///
    /// Re-sending an empty or misconfigured request cannot help; transient
    /// network conditions and server-side errors can clear up.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Transport(_) | Self::Http { .. } | Self::InvalidBody(_) => true,
            Self::EmptyRequest | Self::Config(_) => false,
        }
    }
}
