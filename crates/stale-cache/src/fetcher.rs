//! Capabilities the coordinator consumes

use crate::error::FetchError;
use async_trait::async_trait;
use std::fmt;
use tracing::warn;

/// Performs one round trip to the upstream data source for a key
///
/// Implementations must be safe to call concurrently for different keys. The
/// coordinator never issues overlapping calls for the same key. Dropping the
/// returned future cancels the fetch.
#[async_trait]
pub trait Fetcher<K, V>: Send + Sync + 'static {
    /// Fetch the latest item for `key`, `Ok(None)` when the upstream has none
    async fn fetch(&self, key: &K) -> Result<Option<V>, FetchError>;
}

/// Sink for background refresh failures
///
/// Called with no cache lock held. Implementations must return quickly and
/// must not fail.
pub trait RefreshObserver<K>: Send + Sync + 'static {
    fn refresh_failed(&self, key: &K, error: &FetchError);
}

/// Reports refresh failures as `tracing` warnings
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl<K: fmt::Debug> RefreshObserver<K> for TracingObserver {
    fn refresh_failed(&self, key: &K, error: &FetchError) {
        warn!(key = ?key, error = %error, "Background refresh failed, keeping cached value");
    }
}
