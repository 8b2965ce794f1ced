//! Now-playing service
//!
//! Answers "what is this user listening to" from an in-memory cache in front
//! of the Last.fm API. Stale entries are refreshed in the background.

use lastfm_client::LastFmClient;
use nowplaying::{shutdown_signal, start_server, Config, LastFmSource, ServerState, SharedState};
use nowplaying::{Result, TrackCache};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive("nowplaying=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting now-playing service...");

    // Load configuration from environment
    let config = Config::from_env()?;
    info!("Port: {}", config.port);
    info!("Last.fm API: {}", config.lastfm_base_url);
    info!(
        freshness_ms = config.cache.freshness_window.as_millis() as u64,
        retention_secs = config.cache.idle_retention.as_secs(),
        sweep_interval_secs = config.cache.sweep_interval.as_secs(),
        upstream_timeout_secs = config.upstream_timeout.as_secs(),
        "Cache configuration"
    );

    // Create Last.fm client and the cache in front of it
    let client = LastFmClient::with_base_url(
        &config.lastfm_base_url,
        &config.api_key,
        config.upstream_timeout,
    )?;
    let cache: TrackCache =
        TrackCache::new(Arc::new(LastFmSource::new(client)), config.cache.clone());
    let sweeper = cache.spawn_sweeper();

    // Create shared state
    let state: SharedState = Arc::new(ServerState::new(cache));

    // Serve until SIGINT/SIGTERM
    let result = start_server(state, config.port, shutdown_signal()).await;

    sweeper.abort();
    info!("Server exiting.");
    result
}
