//! Error types used throughout the agent

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for OsLink
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum OsLinkError {
    /// The legacy store could not be opened, queried, or decoded.
    #[error("Legacy store error: {0}")]
    Legacy(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// The remote API answered with a non-success status.
    #[error("Remote API returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OsLinkError {
    /// Whether this failure means "the remote side could not be reached or
    /// refused the call". Transport failures and error statuses are treated
    /// the same by the sync engine.
    pub fn is_remote_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout(_) | Self::Remote { .. } | Self::Decode(_)
        )
    }

    /// Stable label suitable for structured log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Legacy(_) => "legacy",
            Self::Network(_) => "network",
            Self::Timeout(_) => "timeout",
            Self::Remote { .. } => "remote",
            Self::Decode(_) => "decode",
            Self::Persistence(_) => "persistence",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for OsLink operations
pub type Result<T> = std::result::Result<T, OsLinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_failures_are_unavailable() {
        assert!(OsLinkError::Network("refused".into()).is_remote_unavailable());
        assert!(OsLinkError::Timeout(Duration::from_secs(8)).is_remote_unavailable());
        assert!(OsLinkError::Remote { status: 503, message: "down".into() }
            .is_remote_unavailable());
        assert!(!OsLinkError::Legacy("locked".into()).is_remote_unavailable());
        assert!(!OsLinkError::Persistence("disk full".into()).is_remote_unavailable());
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(OsLinkError::Legacy("locked".into())).unwrap();
        assert_eq!(json["type"], "Legacy");
        assert_eq!(json["detail"], "locked");
    }
}
