//! Error types for the cache coordinator

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A failed upstream round trip
///
/// Every upstream failure is treated as transient. The error is cheap to clone
/// so one outcome can be handed to every caller waiting on the same fetch.
#[derive(Debug, Clone)]
pub enum FetchError {
    /// The fetch did not finish within the configured timeout
    Timeout(Duration),
    /// The upstream reported an error
    Upstream(Arc<dyn std::error::Error + Send + Sync>),
}

impl FetchError {
    /// Wrap an upstream error
    pub fn upstream<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Upstream(Arc::new(err))
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout(timeout) => write!(f, "Upstream fetch timed out after {:?}", timeout),
            Self::Upstream(e) => write!(f, "Upstream error: {}", e),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Timeout(_) => None,
            Self::Upstream(e) => Some(&**e),
        }
    }
}

/// Errors surfaced to callers of [`CacheCoordinator::lookup`](crate::CacheCoordinator::lookup)
#[derive(Debug, Clone)]
pub enum LookupError {
    /// The fetch needed to satisfy a cache miss failed. No entry was created,
    /// so the next lookup retries.
    UpstreamUnavailable(FetchError),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpstreamUnavailable(e) => write!(f, "Upstream unavailable: {}", e),
        }
    }
}

impl std::error::Error for LookupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UpstreamUnavailable(e) => Some(e),
        }
    }
}

impl From<FetchError> for LookupError {
    fn from(e: FetchError) -> Self {
        Self::UpstreamUnavailable(e)
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;
