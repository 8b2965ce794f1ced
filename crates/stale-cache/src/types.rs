//! Cache configuration and statistics

use serde::Serialize;
use std::time::Duration;

/// Timing knobs for a [`CacheCoordinator`](crate::CacheCoordinator)
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Age after which a hit triggers a background refresh
    pub freshness_window: Duration,
    /// Age after which the sweep evicts an entry
    pub idle_retention: Duration,
    /// Period of the eviction sweep
    pub sweep_interval: Duration,
    /// Upper bound on a single upstream fetch
    pub fetch_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            freshness_window: Duration::from_secs(1),
            idle_retention: Duration::from_secs(24 * 60 * 60), // 24 hours
            sweep_interval: Duration::from_secs(60 * 60),      // 1 hour
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

/// Statistics about the cache
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub refreshes: u64,
    pub refresh_failures: u64,
    pub evictions: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.freshness_window, Duration::from_secs(1));
        assert_eq!(config.idle_retention, Duration::from_secs(86_400));
        assert_eq!(config.sweep_interval, Duration::from_secs(3_600));
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_cache_stats_serialization() {
        let stats = CacheStats {
            entries: 3,
            hits: 40,
            misses: 3,
            refreshes: 7,
            refresh_failures: 1,
            evictions: 2,
        };

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["entries"], 3);
        assert_eq!(json["hits"], 40);
        assert_eq!(json["refresh_failures"], 1);
        assert_eq!(json["evictions"], 2);
    }
}
