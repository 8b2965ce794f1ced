//! Last.fm as the cache's upstream

use async_trait::async_trait;
use lastfm_client::{LastFmClient, Track};
use stale_cache::{CacheCoordinator, FetchError, Fetcher};
use std::sync::Arc;

/// Latest track per Last.fm username
pub type TrackCache = CacheCoordinator<String, Arc<Track>>;

pub struct LastFmSource {
    client: LastFmClient,
}

impl LastFmSource {
    pub fn new(client: LastFmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher<String, Arc<Track>> for LastFmSource {
    async fn fetch(&self, user: &String) -> Result<Option<Arc<Track>>, FetchError> {
        self.client
            .latest_track(user)
            .await
            .map(|track| track.map(Arc::new))
            .map_err(FetchError::upstream)
    }
}
