//! Error types for serial-dl
//!
//! Inference errors abort the run before any network activity. Fetch errors
//! are scoped to a single attempt and are absorbed by the fetcher's retry loop.

use std::fmt;

/// Main error type for serial-dl operations
#[derive(Debug)]
pub enum Error {
    /// The sample filename has no digit run to anchor the series on
    NoNumberFound(String),

    /// The start token is not a non-negative integer
    InvalidStart(String),

    /// Invalid configuration or parameters
    InvalidInput(String),

    /// Server answered, but not with a successful status
    HttpError(String),

    /// Network connectivity issues
    NetworkError(String),

    /// File I/O error
    IoError(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NoNumberFound(filename) => {
                write!(f, "Not found numbered file in url: '{}'", filename)
            }
            Error::InvalidStart(token) => {
                write!(f, "Start number '{}' is not a non-negative integer", token)
            }
            Error::InvalidInput(msg) => {
                write!(f, "Invalid input: {}", msg)
            }
            Error::HttpError(msg) => {
                write!(f, "HTTP error: {}", msg)
            }
            Error::NetworkError(msg) => {
                write!(f, "Network error: {}", msg)
            }
            Error::IoError(err) => {
                write!(f, "I/O error: {}", err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() || err.is_body() {
            Error::NetworkError(err.to_string())
        } else {
            Error::HttpError(err.to_string())
        }
    }
}

/// Convenience result type for serial-dl operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_offending_value() {
        let err = Error::NoNumberFound("cover.jpg".to_string());
        assert!(err.to_string().contains("cover.jpg"));

        let err = Error::InvalidStart("-1".to_string());
        assert!(err.to_string().contains("-1"));
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error as _;

        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("I/O error"));
    }
}
