//! Error types for the backend gateway.

use thiserror::Error;

use crate::http_client::ClientBuildError;

/// Errors from the token validation and session listing endpoints.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Network-level error (DNS resolution, connection refused, TLS, timeout).
    #[error("network error calling {url}: {source}")]
    Network {
        /// The endpoint that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint answered with a non-2xx status.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// The endpoint that answered.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body was not the expected JSON shape.
    #[error("malformed response from {url}: {reason}")]
    Decode {
        /// The endpoint that answered.
        url: String,
        /// What was wrong with the body.
        reason: String,
    },

    /// The endpoint URL could not be built from the base URL and org slug.
    #[error("invalid endpoint URL {url}: {reason}")]
    InvalidUrl {
        /// The URL (or template) that failed to parse.
        url: String,
        /// Parser error text.
        reason: String,
    },

    /// The HTTP client could not be constructed.
    #[error(transparent)]
    ClientBuild(#[from] ClientBuildError),
}

impl BackendError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a decode error.
    pub fn decode(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_http_status_display() {
        let msg = BackendError::http_status("https://wifi.example.com/api", 401).to_string();
        assert!(msg.contains("401"), "Expected status in: {msg}");
        assert!(msg.contains("https://wifi.example.com/api"), "Expected URL in: {msg}");
    }

    #[test]
    fn test_backend_error_decode_display() {
        let msg = BackendError::decode("https://wifi.example.com/api", "expected a JSON array")
            .to_string();
        assert!(msg.starts_with("malformed response"), "got: {msg}");
        assert!(msg.contains("expected a JSON array"));
    }
}
