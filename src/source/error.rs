//! Error types for live sources.

use thiserror::Error;

/// Errors that can occur while probing the live endpoint.
///
/// "No image yet" is not an error: it is reported as a snapshot whose
/// `exists` flag is false.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The endpoint answered with a non-success status.
    #[error("endpoint returned status {0}")]
    Status(u16),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The configured endpoint cannot be used as a base URL.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl ProbeError {
    /// The status code for transport errors, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProbeError::Status(code) => Some(*code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProbeError::Timeout
        } else if err.is_connect() {
            ProbeError::Connect(err.to_string())
        } else if err.is_decode() {
            ProbeError::Parse(err.to_string())
        } else {
            ProbeError::Request(err.to_string())
        }
    }
}
