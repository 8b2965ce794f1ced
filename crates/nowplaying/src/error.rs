//! Error types for the now-playing service

use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub enum NowPlayingError {
    Config(String),
    LastFm(lastfm_client::LastFmError),
    Io(Box<std::io::Error>),
    Server(String),
    ShutdownTimeout(Duration),
}

impl fmt::Display for NowPlayingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NowPlayingError::Config(msg) => write!(f, "Configuration error: {}", msg),
            NowPlayingError::LastFm(err) => write!(f, "{}", err),
            NowPlayingError::Io(err) => write!(f, "IO error: {}", err),
            NowPlayingError::Server(msg) => write!(f, "Server error: {}", msg),
            NowPlayingError::ShutdownTimeout(grace) => {
                write!(f, "Server forced to shut down after {:?}", grace)
            }
        }
    }
}

impl std::error::Error for NowPlayingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NowPlayingError::LastFm(err) => Some(err),
            NowPlayingError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<lastfm_client::LastFmError> for NowPlayingError {
    fn from(err: lastfm_client::LastFmError) -> Self {
        NowPlayingError::LastFm(err)
    }
}

impl From<std::io::Error> for NowPlayingError {
    fn from(err: std::io::Error) -> Self {
        NowPlayingError::Io(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for NowPlayingError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        NowPlayingError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NowPlayingError>;
