//! Directory Errors
//!
//! Single error type shared by the configuration layer, the remote data
//! service client and the pagination engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DirectoryError>;

#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Missing or malformed configuration value
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport-level failure (connection, timeout, TLS)
    #[error("request to data service failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The data service answered with a non-success status
    #[error("data service returned {status}: {message}")]
    Service { status: u16, message: String },

    /// The response body did not match the expected shape
    #[error("could not decode data service response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl DirectoryError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
