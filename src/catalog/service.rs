//! Catalog domain service
//!
//! Orchestrates storage and the external song info lookup: verse splitting
//! and numbering for newly ingested songs, group-name resolution for partial
//! updates, and re-classification of storage errors into application kinds.

use crate::catalog::db::{SongStore, StorageError};
use crate::catalog::models::{
    NewSongRecord, Song, SongFilter, SongPage, SongPatch, VersePage, VerseSmall,
};
use crate::error::AppError;
use crate::songinfo::SongInfoClient;
use chrono::NaiveDate;
use tracing::{error, info, warn};

/// Date format used by the lookup service and accepted in update requests.
pub const RELEASE_DATE_FORMAT: &str = "%d.%m.%Y";

/// Partial song update addressed by group name rather than group id.
#[derive(Debug, Clone, Default)]
pub struct UpdateSongRequest {
    /// Move the song to the group with this name; it must already exist.
    pub group_name: Option<String>,
    /// Rename the song.
    pub song_name: Option<String>,
    /// Change the release date.
    pub release_date: Option<NaiveDate>,
    /// Change the link.
    pub link: Option<String>,
}

impl UpdateSongRequest {
    /// Returns `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        self.group_name.is_none()
            && self.song_name.is_none()
            && self.release_date.is_none()
            && self.link.is_none()
    }
}

/// Domain service over the song catalog.
pub struct CatalogService {
    store: SongStore,
    info: SongInfoClient,
}

impl CatalogService {
    /// Create a service over the given store and lookup client.
    pub fn new(store: SongStore, info: SongInfoClient) -> Self {
        Self { store, info }
    }

    /// List songs matching the filter, plus the catalog-wide total.
    ///
    /// The total comes from an unfiltered count, so for a filtered listing it
    /// can exceed the number of matching songs.
    pub async fn fetch_songs(&self, filter: SongFilter) -> Result<SongPage, AppError> {
        let rows = self
            .store
            .songs(&filter)
            .await
            .map_err(|err| fetch_error("list songs", err))?;
        let total_count = self
            .store
            .count_songs()
            .await
            .map_err(|err| fetch_error("count songs", err))?;

        Ok(SongPage {
            songs: rows.into_iter().map(Song::from).collect(),
            total_count,
        })
    }

    /// Page through a song's verses, plus the song's verse count.
    pub async fn fetch_verses(
        &self,
        song_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<VersePage, AppError> {
        let verses = self
            .store
            .verses(song_id, limit, offset)
            .await
            .map_err(|err| fetch_error("list verses", err))?;
        let total_count = self
            .store
            .count_verses(song_id)
            .await
            .map_err(|err| fetch_error("count verses", err))?;

        Ok(VersePage {
            verses,
            total_count,
        })
    }

    /// Delete a song and its verses.
    pub async fn delete_song(&self, song_id: i64) -> Result<(), AppError> {
        self.store
            .delete_song(song_id)
            .await
            .map_err(|err| mutation_error("delete song", err))?;

        info!(song_id, "Song deleted");
        Ok(())
    }

    /// Apply a partial update to a song.
    ///
    /// A supplied group name is resolved to its id first; an unknown name is
    /// an error rather than a silently dropped field.
    pub async fn update_song(&self, song_id: i64, req: UpdateSongRequest) -> Result<(), AppError> {
        if req.is_empty() {
            return Err(AppError::Validation(
                "at least one field must be provided".to_string(),
            ));
        }

        let group_id = match &req.group_name {
            Some(name) => Some(
                self.store
                    .group_id(name)
                    .await
                    .map_err(|err| mutation_error("resolve group", err))?
                    .ok_or(AppError::GroupNotFound)?,
            ),
            None => None,
        };

        let patch = SongPatch {
            group_id,
            song_name: req.song_name,
            release_date: req.release_date,
            link: req.link,
        };

        self.store
            .update_song(song_id, &patch)
            .await
            .map_err(|err| mutation_error("update song", err))?;

        info!(song_id, "Song updated");
        Ok(())
    }

    /// Replace the text of one verse of a song.
    ///
    /// Not-found covers both a missing song id and a missing verse number;
    /// the two cases are not distinguished.
    pub async fn update_verse(
        &self,
        song_id: i64,
        verse_number: i64,
        verse_text: &str,
    ) -> Result<(), AppError> {
        self.store
            .update_verse(song_id, verse_number, verse_text)
            .await
            .map_err(|err| mutation_error("update verse", err))?;

        info!(song_id, verse_number, "Verse updated");
        Ok(())
    }

    /// Ingest a new song: look up its details, split the lyric text into
    /// numbered verses, and store everything atomically.
    pub async fn new_song(&self, group_name: &str, song_name: &str) -> Result<Song, AppError> {
        info!(group = group_name, song = song_name, "Ingesting new song");

        let details = self.info.fetch_song_info(group_name, song_name).await?;

        let release_date = NaiveDate::parse_from_str(&details.release_date, RELEASE_DATE_FORMAT)
            .map_err(|e| {
                warn!(
                    "Lookup returned unparseable release date {:?}: {}",
                    details.release_date, e
                );
                AppError::BadDataFormat
            })?;

        let record = NewSongRecord {
            group_name: group_name.to_string(),
            song_name: song_name.to_string(),
            release_date,
            link: details.link,
            verses: split_verses(&details.text),
        };

        let song_id = self
            .store
            .add_song(&record)
            .await
            .map_err(|err| match err {
                StorageError::DuplicateKey => AppError::AlreadyExists,
                StorageError::Timeout(_) => AppError::Timeout("add song".to_string()),
                other => {
                    error!("Failed to store new song: {}", other);
                    AppError::RequestFailed
                }
            })?;

        info!(song_id, verses = record.verses.len(), "New song stored");

        Ok(Song {
            id: song_id,
            group_name: record.group_name,
            song_name: record.song_name,
            release_date,
            link: record.link,
        })
    }
}

/// Split lyric text into numbered verses.
///
/// Literal `\n` two-character sequences are normalized into real line breaks
/// first; the text then splits on every blank line (two consecutive
/// newlines). Segments are kept as-is, with no trimming and no filtering of
/// empty segments, and numbered from 1 in original order. Rejoining the
/// verses with a blank line reconstructs the normalized text.
fn split_verses(text: &str) -> Vec<VerseSmall> {
    let normalized = text.replace("\\n", "\n");

    normalized
        .split("\n\n")
        .enumerate()
        .map(|(i, segment)| VerseSmall {
            verse_number: (i + 1) as i64,
            verse_text: segment.to_string(),
        })
        .collect()
}

/// Map a storage failure from a read path: zero rows means the catalog had
/// nothing to return.
fn fetch_error(op: &str, err: StorageError) -> AppError {
    match err {
        StorageError::RowNotFound => AppError::NoSongs,
        StorageError::Timeout(_) => AppError::Timeout(op.to_string()),
        other => {
            error!("Storage failure during {}: {}", op, other);
            AppError::RequestFailed
        }
    }
}

/// Map a storage failure from a write path: zero rows means the addressed
/// song (or verse) does not exist.
fn mutation_error(op: &str, err: StorageError) -> AppError {
    match err {
        StorageError::RowNotFound => AppError::SongNotFound,
        StorageError::DuplicateKey => AppError::AlreadyExists,
        StorageError::Timeout(_) => AppError::Timeout(op.to_string()),
        other => {
            error!("Storage failure during {}: {}", op, other);
            AppError::RequestFailed
        }
    }
}
