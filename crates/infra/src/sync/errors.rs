//! Agent lifecycle error types

use std::time::Duration;

use oslink_domain::OsLinkError;
use thiserror::Error;

use crate::errors::InfraError;

/// Errors raised while stopping the background sync loop.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The loop did not exit within the join timeout; it keeps running until
    /// its current cycle ends.
    #[error("Sync loop did not stop within {timeout:?}")]
    StopTimeout { timeout: Duration },

    /// The loop task panicked or was aborted.
    #[error("Sync loop task failed: {0}")]
    TaskJoinFailed(String),
}

impl From<AgentError> for InfraError {
    fn from(err: AgentError) -> Self {
        InfraError(OsLinkError::Internal(err.to_string()))
    }
}

impl From<AgentError> for OsLinkError {
    fn from(err: AgentError) -> Self {
        InfraError::from(err).into()
    }
}

/// Convenience alias for agent lifecycle results.
pub type AgentResult<T> = Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_internal_domain_error() {
        let err: OsLinkError = AgentError::StopTimeout { timeout: Duration::from_secs(5) }.into();
        assert_eq!(err, OsLinkError::Internal("Sync loop did not stop within 5s".into()));

        let err = AgentError::StopTimeout { timeout: Duration::from_millis(200) };
        assert_eq!(err.to_string(), "Sync loop did not stop within 200ms");
    }
}
