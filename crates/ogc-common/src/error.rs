//! Error taxonomy for feature discovery.

use thiserror::Error;

/// Result type alias using DiscoveryError.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// How loudly an outcome should be surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// Primary error type for discovery operations.
///
/// Per-layer and per-strategy failures are contained by the caller; only the
/// aggregate outcome of a click crosses the coordinator boundary.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DiscoveryError {
    /// HTTP or network failure. Never retried for the same query.
    #[error("Transport error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// Malformed response body.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The upstream service reported an exception, usually with HTTP 200.
    #[error("WMS Error: {0}")]
    ServiceException(String),

    /// Every layer and the spatial fallback came back empty. Surfaced as an
    /// informational notice rather than a failure.
    #[error("Nothing found")]
    NotFound,

    /// The operation's cancellation scope was cancelled before it settled.
    #[error("Cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DiscoveryError {
    pub fn transport(message: impl Into<String>) -> Self {
        DiscoveryError::Transport {
            status: None,
            message: message.into(),
        }
    }

    pub fn http_status(status: u16) -> Self {
        DiscoveryError::Transport {
            status: Some(status),
            message: format!("unexpected status {status}"),
        }
    }
}
