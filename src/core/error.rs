//! Core error types.

use std::fmt;

/// Core errors for request/response handling.
#[derive(Debug)]
pub enum Error {
    /// Invalid HTTP request.
    InvalidRequest(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidRequest(msg) => write!(f, "invalid request: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<http::uri::InvalidUri> for Error {
    fn from(e: http::uri::InvalidUri) -> Self {
        Error::InvalidRequest(e.to_string())
    }
}

impl From<http::uri::InvalidUriParts> for Error {
    fn from(e: http::uri::InvalidUriParts) -> Self {
        Error::InvalidRequest(e.to_string())
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
