//! Last.fm wire types
//!
//! Field names mirror the Last.fm JSON, including its `#text` and `@attr` keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Envelope of a `user.getrecenttracks` response
///
/// Last.fm reports failures in the body, sometimes with a 200 status.
#[derive(Debug, Deserialize)]
pub(crate) struct RecentTracksResponse {
    #[serde(default)]
    pub recenttracks: Option<RecentTracks>,
    #[serde(default)]
    pub error: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecentTracks {
    #[serde(default)]
    pub track: Vec<Track>,
}

/// A scrobbled or currently playing track
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub artist: TextRef,
    #[serde(default)]
    pub album: TextRef,
    #[serde(default)]
    pub image: Vec<Image>,
    #[serde(default)]
    pub streamable: String,
    /// Absent while the track is playing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<TrackDate>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mbid: String,
    #[serde(rename = "@attr", default, skip_serializing_if = "Option::is_none")]
    pub attr: Option<TrackAttr>,
}

impl Track {
    pub fn is_now_playing(&self) -> bool {
        self.attr
            .as_ref()
            .map(|attr| attr.nowplaying == "true")
            .unwrap_or(false)
    }

    /// Unix timestamp of the scrobble, if Last.fm sent a parsable one
    pub fn played_at(&self) -> Option<i64> {
        self.date
            .as_ref()
            .filter(|date| !date.uts.is_empty())
            .and_then(|date| date.uts.parse().ok())
    }

    pub fn played_at_utc(&self) -> Option<DateTime<Utc>> {
        self.played_at()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

/// Named reference with an optional MusicBrainz id (artist, album)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextRef {
    #[serde(rename = "#text", default)]
    pub text: String,
    #[serde(default)]
    pub mbid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    #[serde(rename = "#text", default)]
    pub url: String,
    #[serde(default)]
    pub size: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackDate {
    #[serde(default)]
    pub uts: String,
    #[serde(rename = "#text", default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackAttr {
    #[serde(default)]
    pub nowplaying: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW_PLAYING: &str = r##"{
        "recenttracks": {
            "track": [
                {
                    "artist": {"mbid": "a74b1b7f", "#text": "Portishead"},
                    "streamable": "0",
                    "image": [
                        {"size": "small", "#text": "https://lastfm.freetls.fastly.net/i/u/34s/x.png"},
                        {"size": "large", "#text": "https://lastfm.freetls.fastly.net/i/u/174s/x.png"}
                    ],
                    "mbid": "",
                    "album": {"mbid": "", "#text": "Dummy"},
                    "name": "Roads",
                    "@attr": {"nowplaying": "true"},
                    "url": "https://www.last.fm/music/Portishead/_/Roads"
                }
            ],
            "@attr": {"user": "rj", "totalPages": "100", "page": "1", "perPage": "1", "total": "100"}
        }
    }"##;

    const SCROBBLED: &str = r##"{
        "artist": {"mbid": "", "#text": "Massive Attack"},
        "album": {"mbid": "", "#text": "Mezzanine"},
        "name": "Teardrop",
        "date": {"uts": "1700000000", "#text": "14 Nov 2023, 22:13"},
        "url": "https://www.last.fm/music/Massive+Attack/_/Teardrop"
    }"##;

    #[test]
    fn test_now_playing_deserialization() {
        let response: RecentTracksResponse = serde_json::from_str(NOW_PLAYING).unwrap();
        let tracks = response.recenttracks.unwrap().track;
        assert_eq!(tracks.len(), 1);

        let track = &tracks[0];
        assert_eq!(track.artist.text, "Portishead");
        assert_eq!(track.album.text, "Dummy");
        assert_eq!(track.image.len(), 2);
        assert_eq!(track.image[1].size, "large");
        assert!(track.is_now_playing());
        assert_eq!(track.played_at(), None);
    }

    #[test]
    fn test_scrobbled_track_dates() {
        let track: Track = serde_json::from_str(SCROBBLED).unwrap();
        assert!(!track.is_now_playing());
        assert_eq!(track.played_at(), Some(1_700_000_000));
        assert_eq!(
            track.played_at_utc().unwrap().to_rfc3339(),
            "2023-11-14T22:13:20+00:00"
        );
    }

    #[test]
    fn test_unparsable_uts_is_ignored() {
        let mut track: Track = serde_json::from_str(SCROBBLED).unwrap();
        track.date = Some(TrackDate {
            uts: "yesterday".to_string(),
            text: String::new(),
        });
        assert_eq!(track.played_at(), None);
    }

    #[test]
    fn test_error_body_deserialization() {
        let response: RecentTracksResponse =
            serde_json::from_str(r#"{"error": 6, "message": "User not found"}"#).unwrap();
        assert_eq!(response.error, Some(6));
        assert_eq!(response.message.as_deref(), Some("User not found"));
        assert!(response.recenttracks.is_none());
    }

    #[test]
    fn test_serialization_uses_lastfm_keys() {
        let track: Track = serde_json::from_str(SCROBBLED).unwrap();
        let json = serde_json::to_value(&track).unwrap();
        assert_eq!(json["artist"]["#text"], "Massive Attack");
        assert_eq!(json["date"]["uts"], "1700000000");
        assert!(json.get("@attr").is_none());
    }
}
