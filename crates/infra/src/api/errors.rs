//! API-specific error types
//!
//! Classifies failed order API responses before they are folded into the
//! domain error.

use std::time::Duration;

use oslink_domain::OsLinkError;
use reqwest::StatusCode;
use thiserror::Error;

/// Categories of API errors, used for log triage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// 401, 403: the bearer token was rejected
    Authentication,
    /// 429
    RateLimit,
    /// 5xx
    Server,
    /// Other 4xx
    Client,
    /// Connection failures and timeouts
    Network,
    /// Unusable base URL or request
    Config,
}

/// Order API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Client error ({status}): {message}")]
    Client { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Classify a non-success response. Long bodies are cut so log lines
    /// stay readable.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = summarize_body(status, body);
        let code = status.as_u16();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Auth { status: code, message },
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimit(message),
            s if s.is_server_error() => Self::Server { status: code, message },
            _ => Self::Client { status: code, message },
        }
    }

    /// Get the error category for this error
    pub const fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Auth { .. } => ApiErrorCategory::Authentication,
            Self::RateLimit(_) => ApiErrorCategory::RateLimit,
            Self::Server { .. } => ApiErrorCategory::Server,
            Self::Client { .. } | Self::Decode(_) => ApiErrorCategory::Client,
            Self::Network(_) | Self::Timeout(_) => ApiErrorCategory::Network,
            Self::Config(_) => ApiErrorCategory::Config,
        }
    }
}

impl From<OsLinkError> for ApiError {
    fn from(err: OsLinkError) -> Self {
        match err {
            OsLinkError::Network(msg) => Self::Network(msg),
            OsLinkError::Timeout(after) => Self::Timeout(after),
            OsLinkError::Decode(msg) => Self::Decode(msg),
            OsLinkError::Config(msg) => Self::Config(msg),
            OsLinkError::Remote { status, message } => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                Self::from_status(status, &message)
            }
            other => Self::Network(other.to_string()),
        }
    }
}

impl From<ApiError> for OsLinkError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Auth { status, message }
            | ApiError::Server { status, message }
            | ApiError::Client { status, message } => Self::Remote { status, message },
            ApiError::RateLimit(message) => {
                Self::Remote { status: StatusCode::TOO_MANY_REQUESTS.as_u16(), message }
            }
            ApiError::Network(msg) => Self::Network(msg),
            ApiError::Timeout(after) => Self::Timeout(after),
            ApiError::Decode(msg) => Self::Decode(msg),
            ApiError::Config(msg) => Self::Config(msg),
        }
    }
}

fn summarize_body(status: StatusCode, body: &str) -> String {
    const MAX_CHARS: usize = 200;
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status.canonical_reason().unwrap_or("no response body").to_string();
    }
    if trimmed.chars().count() <= MAX_CHARS {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(MAX_CHARS).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, "").category(),
            ApiErrorCategory::Authentication
        );
        assert_eq!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, "slow down").category(),
            ApiErrorCategory::RateLimit
        );
        assert_eq!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "").category(),
            ApiErrorCategory::Server
        );
        assert_eq!(
            ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "bad field").category(),
            ApiErrorCategory::Client
        );
    }

    #[test]
    fn test_domain_conversion_keeps_status() {
        let err: OsLinkError = ApiError::from_status(StatusCode::FORBIDDEN, "nope").into();
        assert_eq!(err, OsLinkError::Remote { status: 403, message: "nope".into() });
        assert!(err.is_remote_unavailable());
    }

    #[test]
    fn test_empty_body_uses_reason_phrase() {
        let err = ApiError::from_status(StatusCode::SERVICE_UNAVAILABLE, "  ");
        assert!(err.to_string().contains("Service Unavailable"));
    }

    #[test]
    fn test_long_body_is_truncated() {
        let body = "x".repeat(500);
        match ApiError::from_status(StatusCode::BAD_REQUEST, &body) {
            ApiError::Client { message, .. } => {
                assert!(message.ends_with("..."));
                assert_eq!(message.len(), 203);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_transport_errors_round_trip() {
        let api: ApiError = OsLinkError::Timeout(Duration::from_secs(8)).into();
        assert_eq!(api.category(), ApiErrorCategory::Network);
        assert_eq!(OsLinkError::from(api), OsLinkError::Timeout(Duration::from_secs(8)));
    }
}
