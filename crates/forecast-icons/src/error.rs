//! Icon loading errors.

use forecast_core::NetworkError;
use reqwest::StatusCode;
use thiserror::Error;

use crate::retry::{is_retryable_status, RetryDecision};

#[derive(Debug, Clone, Error)]
pub enum IconError {
    #[error("Network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: NetworkError,
    },

    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    #[error("Could not decode image from {url}: {message}")]
    Decode { url: String, message: String },

    /// The download task panicked or was aborted.
    #[error("Icon fetch task failed: {0}")]
    Task(String),
}

impl IconError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network { source, .. } => source.user_message(),
            Self::Status { status, .. } if *status == 404 => "Weather icon not found.",
            Self::Status { .. } => "Weather icon could not be downloaded.",
            Self::Decode { .. } => "Weather icon is not a valid image.",
            Self::Task(_) => "Weather icon could not be loaded.",
        }
    }

    /// Whether trying the same URL again could succeed. Statuses follow
    /// the HTTP retry policy.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Task(_) => true,
            Self::Status { status, .. } => StatusCode::from_u16(*status)
                .map(|status| is_retryable_status(status) == RetryDecision::Retry)
                .unwrap_or(false),
            Self::Decode { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_user_messages() {
        let err = IconError::Status {
            url: "http://x/01d.png".into(),
            status: 404,
        };
        assert!(err.user_message().contains("not found"));
        assert!(err.to_string().contains("404"));

        let err = IconError::Network {
            url: "http://x/01d.png".into(),
            source: NetworkError::Timeout,
        };
        assert!(err.user_message().contains("timed out"));
    }

    #[test]
    fn test_is_retryable() {
        let server = IconError::Status {
            url: String::new(),
            status: 502,
        };
        let missing = IconError::Status {
            url: String::new(),
            status: 404,
        };
        let decode = IconError::Decode {
            url: String::new(),
            message: "bad".into(),
        };
        let throttled = IconError::Status {
            url: String::new(),
            status: 429,
        };
        assert!(server.is_retryable());
        assert!(throttled.is_retryable());
        assert!(!missing.is_retryable());
        assert!(!decode.is_retryable());
        assert!(IconError::Task("panic".into()).is_retryable());
    }
}
