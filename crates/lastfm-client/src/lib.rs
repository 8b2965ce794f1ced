//! Rust client for the Last.fm recent tracks API
//!
//! Covers the single endpoint needed to answer "what is this user listening
//! to": `user.getrecenttracks` with `limit=1`.
//!
//! # Example
//!
//! ```no_run
//! use lastfm_client::LastFmClient;
//!
//! # async fn example() -> Result<(), lastfm_client::LastFmError> {
//! let client = LastFmClient::new("my-api-key")?;
//!
//! if let Some(track) = client.latest_track("rj").await? {
//!     println!("{} - {} (now playing: {})", track.artist.text, track.name, track.is_now_playing());
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod types;

pub use client::LastFmClient;
pub use error::{LastFmError, Result};
pub use types::{Image, TextRef, Track, TrackAttr, TrackDate};
