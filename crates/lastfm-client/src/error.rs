//! Error types for the Last.fm client

use std::fmt;

/// Errors that can occur when talking to Last.fm
#[derive(Debug)]
pub enum LastFmError {
    /// Request could not be sent or the body could not be read
    Http(reqwest::Error),
    /// Non-success HTTP status without a Last.fm error body
    Status(u16),
    /// Body was not the expected JSON
    Json(serde_json::Error),
    /// Last.fm answered with an error object
    Api { code: u32, message: String },
}

impl fmt::Display for LastFmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "Last.fm HTTP error: {}", e),
            Self::Status(status) => write!(f, "Last.fm returned status {}", status),
            Self::Json(e) => write!(f, "Last.fm JSON parse error: {}", e),
            Self::Api { code, message } => write!(f, "Last.fm API error {}: {}", code, message),
        }
    }
}

impl std::error::Error for LastFmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Status(_) | Self::Api { .. } => None,
        }
    }
}

impl From<reqwest::Error> for LastFmError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<serde_json::Error> for LastFmError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Result type for Last.fm operations
pub type Result<T> = std::result::Result<T, LastFmError>;
