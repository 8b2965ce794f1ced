//! Now-playing service library
//!
//! Serves the latest Last.fm track per user from a stale-while-revalidate
//! cache, as plain JSON or as a shields.io badge payload.

pub mod config;
pub mod error;
pub mod server;
pub mod source;
pub mod types;

pub use config::Config;
pub use error::{NowPlayingError, Result};
pub use server::{create_router, shutdown_signal, start_server, ServerState, SharedState};
pub use source::{LastFmSource, TrackCache};
