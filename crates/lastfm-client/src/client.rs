//! Last.fm API HTTP client

use crate::error::{LastFmError, Result};
use crate::types::{RecentTracksResponse, Track};
use std::time::Duration;
use tracing::debug;

/// Client for the Last.fm `user.getrecenttracks` endpoint
pub struct LastFmClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl LastFmClient {
    /// Base URL of the Last.fm API
    pub const DEFAULT_BASE_URL: &'static str = "https://ws.audioscrobbler.com/2.0/";
    /// Default request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a client against the public Last.fm API
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_base_url(Self::DEFAULT_BASE_URL, api_key, Self::DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom API URL and timeout
    pub fn with_base_url(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn recent_tracks_url(&self, user: &str) -> String {
        format!(
            "{}?method=user.getrecenttracks&limit=1&format=json&user={}&api_key={}",
            self.base_url,
            urlencoding::encode(user),
            urlencoding::encode(&self.api_key)
        )
    }

    /// Get the most recent track for a user
    ///
    /// Returns the currently playing track when there is one, otherwise the
    /// last scrobble. `Ok(None)` means the user has no tracks at all.
    pub async fn latest_track(&self, user: &str) -> Result<Option<Track>> {
        let response = self.http.get(self.recent_tracks_url(user)).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            // Error bodies carry a more useful message than the status code
            return Err(match serde_json::from_slice::<RecentTracksResponse>(&body) {
                Ok(RecentTracksResponse {
                    error: Some(code),
                    message,
                    ..
                }) => LastFmError::Api {
                    code,
                    message: message.unwrap_or_default(),
                },
                _ => LastFmError::Status(status.as_u16()),
            });
        }

        let data: RecentTracksResponse = serde_json::from_slice(&body)?;

        if let Some(code) = data.error {
            return Err(LastFmError::Api {
                code,
                message: data.message.unwrap_or_default(),
            });
        }

        let track = data
            .recenttracks
            .and_then(|recent| recent.track.into_iter().next());

        debug!(
            user,
            found = track.is_some(),
            now_playing = track.as_ref().map(Track::is_now_playing).unwrap_or(false),
            played_at = ?track.as_ref().and_then(Track::played_at_utc),
            "Fetched latest track"
        );

        Ok(track)
    }
}
