use crate::error::{NowPlayingError, Result};
use lastfm_client::LastFmClient;
use stale_cache::CacheConfig;
use std::env;
use std::time::Duration;

/// Service configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub api_key: String,
    pub lastfm_base_url: String,
    pub upstream_timeout: Duration,
    pub cache: CacheConfig,
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Parse configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("LASTFM_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| NowPlayingError::Config("LASTFM_API_KEY is not set".to_string()))?;

        let port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let lastfm_base_url = lookup("LASTFM_BASE_URL")
            .unwrap_or_else(|| LastFmClient::DEFAULT_BASE_URL.to_string());

        // Zero or unparsable values fall back to the defaults
        let positive = |name: &str, default: u64| {
            lookup(name)
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };

        let upstream_timeout = Duration::from_secs(positive("UPSTREAM_TIMEOUT_SECS", 10));

        let cache = CacheConfig {
            freshness_window: Duration::from_millis(positive("CACHE_FRESHNESS_MS", 1_000)),
            idle_retention: Duration::from_secs(positive("CACHE_RETENTION_SECS", 24 * 60 * 60)),
            sweep_interval: Duration::from_secs(positive("CACHE_SWEEP_INTERVAL_SECS", 60 * 60)),
            fetch_timeout: upstream_timeout,
        };

        Ok(Self {
            port,
            api_key,
            lastfm_base_url,
            upstream_timeout,
            cache,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[("LASTFM_API_KEY", "secret")]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.lastfm_base_url, "https://ws.audioscrobbler.com/2.0/");
        assert_eq!(config.upstream_timeout, Duration::from_secs(10));
        assert_eq!(config.cache.freshness_window, Duration::from_secs(1));
        assert_eq!(config.cache.idle_retention, Duration::from_secs(86_400));
        assert_eq!(config.cache.sweep_interval, Duration::from_secs(3_600));
        assert_eq!(config.cache.fetch_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_missing_api_key() {
        let err = parse(&[("PORT", "9000")]).unwrap_err();
        assert!(matches!(err, NowPlayingError::Config(_)));
        assert!(err.to_string().contains("LASTFM_API_KEY"));
    }

    #[test]
    fn test_blank_api_key() {
        assert!(parse(&[("LASTFM_API_KEY", "  ")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = parse(&[
            ("LASTFM_API_KEY", "secret"),
            ("PORT", "3005"),
            ("LASTFM_BASE_URL", "http://localhost:9999/2.0/"),
            ("UPSTREAM_TIMEOUT_SECS", "3"),
            ("CACHE_FRESHNESS_MS", "250"),
            ("CACHE_RETENTION_SECS", "600"),
            ("CACHE_SWEEP_INTERVAL_SECS", "60"),
        ])
        .unwrap();

        assert_eq!(config.port, 3005);
        assert_eq!(config.lastfm_base_url, "http://localhost:9999/2.0/");
        assert_eq!(config.cache.freshness_window, Duration::from_millis(250));
        assert_eq!(config.cache.idle_retention, Duration::from_secs(600));
        assert_eq!(config.cache.sweep_interval, Duration::from_secs(60));
        assert_eq!(config.cache.fetch_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = parse(&[
            ("LASTFM_API_KEY", "secret"),
            ("PORT", "not-a-port"),
            ("CACHE_SWEEP_INTERVAL_SECS", "0"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.cache.sweep_interval, Duration::from_secs(3_600));
    }
}
