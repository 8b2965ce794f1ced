//! Response bodies served by the HTTP layer

use lastfm_client::{Image, TextRef, Track, TrackAttr};
use serde::Serialize;
use stale_cache::CacheStats;

/// Status-only body (`BAD_REQUEST`, `NO_TRACKS_FOUND`, `UPSTREAM_ERROR`)
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub const BAD_REQUEST: Self = Self {
        message: "BAD_REQUEST",
    };
    pub const NO_TRACKS_FOUND: Self = Self {
        message: "NO_TRACKS_FOUND",
    };
    pub const UPSTREAM_ERROR: Self = Self {
        message: "UPSTREAM_ERROR",
    };
}

/// shields.io endpoint badge payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShieldsResponse {
    pub schema_version: u8,
    pub label: &'static str,
    pub message: String,
}

impl ShieldsResponse {
    pub fn from_track(track: &Track) -> Self {
        let label = if track.is_now_playing() {
            "Now Playing"
        } else {
            "Last.fm"
        };

        Self {
            schema_version: 1,
            label,
            message: format!("{} – {}", track.artist.text, track.name),
        }
    }
}

/// Track as served to clients: the Last.fm fields with the `date` object
/// replaced by a numeric `date_uts`
#[derive(Debug, Serialize)]
pub struct TrackView {
    pub artist: TextRef,
    pub album: TextRef,
    pub image: Vec<Image>,
    pub streamable: String,
    pub url: String,
    pub name: String,
    pub mbid: String,
    #[serde(rename = "@attr")]
    pub attr: TrackAttr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_uts: Option<i64>,
}

impl From<&Track> for TrackView {
    fn from(track: &Track) -> Self {
        Self {
            artist: track.artist.clone(),
            album: track.album.clone(),
            image: track.image.clone(),
            streamable: track.streamable.clone(),
            url: track.url.clone(),
            name: track.name.clone(),
            mbid: track.mbid.clone(),
            attr: track.attr.clone().unwrap_or_default(),
            date_uts: track.played_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub track: TrackView,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: u64,
    pub cache: CacheStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lastfm_client::TrackDate;

    fn scrobbled() -> Track {
        Track {
            artist: TextRef {
                text: "Massive Attack".to_string(),
                mbid: String::new(),
            },
            name: "Teardrop".to_string(),
            date: Some(TrackDate {
                uts: "1700000000".to_string(),
                text: "14 Nov 2023, 22:13".to_string(),
            }),
            ..Track::default()
        }
    }

    #[test]
    fn test_shields_label_for_scrobble() {
        let shields = ShieldsResponse::from_track(&scrobbled());
        assert_eq!(shields.label, "Last.fm");
        assert_eq!(shields.message, "Massive Attack – Teardrop");

        let json = serde_json::to_value(&shields).unwrap();
        assert_eq!(json["schemaVersion"], 1);
    }

    #[test]
    fn test_shields_label_for_now_playing() {
        let mut track = scrobbled();
        track.attr = Some(TrackAttr {
            nowplaying: "true".to_string(),
        });
        assert_eq!(ShieldsResponse::from_track(&track).label, "Now Playing");
    }

    #[test]
    fn test_track_view_replaces_date() {
        let json = serde_json::to_value(TrackResponse {
            track: TrackView::from(&scrobbled()),
        })
        .unwrap();

        assert_eq!(json["track"]["date_uts"], 1_700_000_000);
        assert!(json["track"].get("date").is_none());
        assert_eq!(json["track"]["@attr"]["nowplaying"], "");
        assert_eq!(json["track"]["artist"]["#text"], "Massive Attack");
    }

    #[test]
    fn test_track_view_without_date() {
        let mut track = scrobbled();
        track.date = None;
        let json = serde_json::to_value(TrackView::from(&track)).unwrap();
        assert!(json.get("date_uts").is_none());
    }
}
