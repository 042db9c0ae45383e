//! Data models for the song catalog.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A song as returned to API consumers, with its group resolved to a name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Song {
    /// Unique identifier of the song.
    pub id: i64,
    /// Name of the group that performs the song.
    pub group_name: String,
    /// Title of the song.
    pub song_name: String,
    /// Release date of the song.
    pub release_date: NaiveDate,
    /// Link to the song (e.g. a YouTube URL).
    pub link: String,
}

/// A song row as stored, joined with its group name.
#[derive(Debug, Clone, FromRow)]
pub struct SongRow {
    /// Unique identifier of the song.
    pub song_id: i64,
    /// Name of the owning group.
    pub group_name: String,
    /// Title of the song.
    pub song_name: String,
    /// Release date of the song.
    pub release_date: NaiveDate,
    /// Link to the song.
    pub link: String,
}

impl From<SongRow> for Song {
    fn from(row: SongRow) -> Self {
        Song {
            id: row.song_id,
            group_name: row.group_name,
            song_name: row.song_name,
            release_date: row.release_date,
            link: row.link,
        }
    }
}

/// A single numbered verse of a song.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct VerseSmall {
    /// Position of the verse within the song, starting at 1.
    pub verse_number: i64,
    /// Text of the verse.
    pub verse_text: String,
}

/// Optional filters and paging for listing songs.
///
/// Every filter that is `None` is left out of the query entirely, so an
/// empty filter matches the whole catalog.
#[derive(Debug, Clone, Default)]
pub struct SongFilter {
    /// Match songs whose group name contains this fragment (case-insensitive).
    pub group_name: Option<String>,
    /// Match songs whose title contains this fragment (case-insensitive).
    pub song_name: Option<String>,
    /// Match songs where any verse contains this fragment (case-insensitive).
    pub song_text: Option<String>,
    /// Match songs released on this exact date.
    pub release_date: Option<NaiveDate>,
    /// Maximum number of songs to return.
    pub limit: i64,
    /// Number of songs to skip.
    pub offset: i64,
}

/// Everything needed to persist a new song with its verses.
#[derive(Debug, Clone)]
pub struct NewSongRecord {
    /// Name of the group; created on the fly if it does not exist yet.
    pub group_name: String,
    /// Title of the song.
    pub song_name: String,
    /// Release date of the song.
    pub release_date: NaiveDate,
    /// Link to the song.
    pub link: String,
    /// Verses in order; empty is allowed.
    pub verses: Vec<VerseSmall>,
}

/// Partial update of a song row. Fields left as `None` are not touched.
#[derive(Debug, Clone, Default)]
pub struct SongPatch {
    /// Move the song to another (already existing) group.
    pub group_id: Option<i64>,
    /// Rename the song.
    pub song_name: Option<String>,
    /// Change the release date.
    pub release_date: Option<NaiveDate>,
    /// Change the link.
    pub link: Option<String>,
}

impl SongPatch {
    /// Returns `true` when no field is set, i.e. the patch would be a no-op.
    pub fn is_empty(&self) -> bool {
        self.group_id.is_none()
            && self.song_name.is_none()
            && self.release_date.is_none()
            && self.link.is_none()
    }
}

/// One page of songs together with the total catalog size.
#[derive(Debug, Clone, Serialize)]
pub struct SongPage {
    /// Songs on this page, newest release first.
    pub songs: Vec<Song>,
    /// Total number of songs in the catalog.
    pub total_count: i64,
}

/// One page of a song's verses together with the song's verse count.
#[derive(Debug, Clone, Serialize)]
pub struct VersePage {
    /// Verses on this page, in verse order.
    pub verses: Vec<VerseSmall>,
    /// Total number of verses the song has.
    pub total_count: i64,
}
