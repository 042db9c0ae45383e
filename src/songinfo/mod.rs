//! Song info lookup module
//!
//! Client for the external "song info" service that supplies the release
//! date, full lyric text, and media link for a (group, song) pair. The
//! client performs a single GET per lookup and never retries; retry policy,
//! if any, belongs to callers.

pub mod client;
pub mod error;

pub use client::{SongInfo, SongInfoClient};
pub use error::InfoError;
