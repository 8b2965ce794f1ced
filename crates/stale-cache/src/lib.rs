//! In-memory stale-while-revalidate cache
//!
//! Lookups are answered from memory. A stale hit is served immediately while a
//! single background refresh runs for that key; only a miss waits on the
//! upstream. Entries nobody has refreshed within the idle-retention window are
//! evicted by a periodic sweep.
//!
//! # Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use stale_cache::{CacheConfig, CacheCoordinator, FetchError, Fetcher};
//! use std::sync::Arc;
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl Fetcher<String, String> for Echo {
//!     async fn fetch(&self, key: &String) -> Result<Option<String>, FetchError> {
//!         Ok(Some(key.to_uppercase()))
//!     }
//! }
//!
//! # async fn example() -> Result<(), stale_cache::LookupError> {
//! let cache = CacheCoordinator::new(Arc::new(Echo), CacheConfig::default());
//! let _sweeper = cache.spawn_sweeper();
//!
//! let value = cache.lookup(&"alice".to_string()).await?;
//! assert_eq!(value.as_deref(), Some("ALICE"));
//! # Ok(())
//! # }
//! ```

mod coordinator;
mod error;
mod fetcher;
mod types;

pub use coordinator::{CacheCoordinator, CacheKey, MIN_SWEEP_INTERVAL};
pub use error::{FetchError, LookupError, Result};
pub use fetcher::{Fetcher, RefreshObserver, TracingObserver};
pub use types::{CacheConfig, CacheStats};
