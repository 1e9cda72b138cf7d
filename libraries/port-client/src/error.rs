//! Error types for the Port client.

use thiserror::Error;

/// Errors that can occur when talking to the Port API.
#[derive(Error, Debug)]
pub enum PortClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// No access token has been obtained yet, or the API rejected it
    #[error("Authentication required")]
    AuthRequired,

    /// Client credentials were rejected
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// API rejected the request shape (HTTP 422)
    #[error("Invalid request to {url}: {message}")]
    InvalidRequest { url: String, message: String },

    /// Invalid API URL
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse API response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// API is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),
}

impl PortClientError {
    /// HTTP status attached to this error, if the API answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ServerError { status, .. } => Some(*status),
            Self::AuthRequired | Self::AuthFailed(_) => Some(401),
            Self::InvalidRequest { .. } => Some(422),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub(crate) fn from_send(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            Self::ServerUnreachable(e.to_string())
        } else {
            Self::Request(e)
        }
    }
}

/// Result type for Port client operations.
pub type Result<T> = std::result::Result<T, PortClientError>;
