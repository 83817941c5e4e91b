//! Error types for teamcms
//!
//! ## Table of Contents
//! - **CmsError**: Main error enum covering all failure modes
//! - **ErrorKind**: Fieldless classification of a `CmsError`
//! - **Result**: Type alias for `Result<T, CmsError>`

use thiserror::Error;

/// Result type alias for content operations
pub type Result<T> = std::result::Result<T, CmsError>;

/// Main error type for content operations
#[derive(Error, Debug)]
pub enum CmsError {
    /// Invalid configuration (origin, token, client setup)
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport failure: connect, timeout, reset
    #[error("network error: {0}")]
    Network(String),

    /// The content API answered with a non-success status
    #[error("content API returned {status} for {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Response body was not the expected envelope
    #[error("decode error: {0}")]
    Decode(String),

    /// Internal error (should not occur in normal operation)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Classification of a [`CmsError`] without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`CmsError::Config`]
    Config,
    /// See [`CmsError::Network`]
    Network,
    /// See [`CmsError::Status`]
    Status,
    /// See [`CmsError::Decode`]
    Decode,
    /// See [`CmsError::Internal`]
    Internal,
}

impl CmsError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a status error
    pub fn status(status: u16, url: impl Into<String>) -> Self {
        Self::Status {
            status,
            url: url.into(),
        }
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Network(_) => ErrorKind::Network,
            Self::Status { .. } => ErrorKind::Status,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<reqwest::Error> for CmsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        match err.status() {
            Some(status) => Self::Status {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            },
            None => Self::Network(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for CmsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
