//! Song catalog storage
//!
//! Handles all database interactions for groups, songs, and verses. Filtered
//! queries and partial updates are assembled clause-by-clause so that every
//! filter combination runs through the same statement builder.

use crate::catalog::models::{NewSongRecord, SongFilter, SongPatch, SongRow, VerseSmall};
use crate::error::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Wall-clock bound on the song+verses insert transaction.
const ADD_SONG_TIMEOUT: Duration = Duration::from_secs(30);

/// Songs returned per page when the caller supplies no usable limit.
const DEFAULT_SONG_LIMIT: i64 = 10;

/// Largest accepted song page size; anything above falls back to the default.
const MAX_SONG_LIMIT: i64 = 100;

/// Verses returned per page when the caller supplies no usable limit.
const DEFAULT_VERSE_LIMIT: i64 = 2;

/// Errors surfaced by catalog storage operations.
///
/// These are sentinel conditions the domain service branches on; driver
/// details stay inside the [`Database`](StorageError::Database) variant.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The statement matched no row (missing song, verse, or group).
    #[error("row not found")]
    RowNotFound,

    /// An insert collided with a uniqueness constraint.
    #[error("duplicate key")]
    DuplicateKey,

    /// The operation did not finish within its deadline.
    #[error("storage operation timed out after {0} seconds")]
    Timeout(u64),

    /// Any other database failure.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        if matches!(err, sqlx::Error::RowNotFound) {
            return StorageError::RowNotFound;
        }
        if err
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation())
        {
            return StorageError::DuplicateKey;
        }
        StorageError::Database(err)
    }
}

/// Database connection pool for catalog operations
pub struct SongStore {
    pool: SqlitePool,
}

impl SongStore {
    /// Initialize database connection pool and apply migrations
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file, with or without the `sqlite:` scheme
    /// * `max_connections` - Upper bound on pooled connections
    /// * `max_lifetime_mins` - Optional per-connection lifetime in minutes
    ///
    /// # Returns
    /// * `Ok(SongStore)` if successful
    /// * `Err(AppError)` if connection or migration failed
    pub async fn new(
        db_path: &str,
        max_connections: u32,
        max_lifetime_mins: Option<u64>,
    ) -> Result<Self, AppError> {
        let path_part = db_path.strip_prefix("sqlite:").unwrap_or(db_path);

        // Ensure parent directory exists for file-backed databases
        if path_part != ":memory:" {
            if let Some(parent) = Path::new(path_part).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        AppError::Internal(anyhow::anyhow!("Failed to create db directory: {}", e))
                    })?;
                }
            }
        }

        let connection_string = format!("sqlite:{}", path_part);
        let options = SqliteConnectOptions::from_str(&connection_string)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid database path: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
        if let Some(mins) = max_lifetime_mins {
            pool_options = pool_options.max_lifetime(Duration::from_secs(mins * 60));
        }

        let pool = pool_options.connect_with(options).await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to connect to database: {}", e))
        })?;

        info!("Connected to SQLite database at: {}", path_part);

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations...");

        let migration_sql = include_str!("../../migrations/001_create_songs.sql");

        // Remove comments (lines starting with --) and normalize whitespace
        let mut cleaned_sql = String::new();
        for line in migration_sql.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with("--") {
                continue;
            }
            let without_comments = if let Some(comment_pos) = trimmed.find("--") {
                &trimmed[..comment_pos]
            } else {
                trimmed
            };
            cleaned_sql.push_str(without_comments.trim());
            cleaned_sql.push(' ');
        }

        // Split by semicolon and execute each statement separately
        let statements: Vec<&str> = cleaned_sql
            .split(';')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::Internal(anyhow::anyhow!(
                        "Migration failed: {} - Statement: {}",
                        e,
                        statement.chars().take(100).collect::<String>()
                    ))
                })?;
        }

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Look up a group's id by exact name match.
    pub async fn group_id(&self, name: &str) -> Result<Option<i64>, StorageError> {
        let id = sqlx::query_scalar::<_, i64>("SELECT group_id FROM groups WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(id)
    }

    /// Count all songs in the catalog.
    ///
    /// Intentionally unfiltered: the listing endpoint reports the catalog
    /// total alongside a filtered page, so this count can exceed the number
    /// of rows a filtered [`songs`](SongStore::songs) call returns.
    pub async fn count_songs(&self) -> Result<i64, StorageError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM songs")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Fetch one page of songs matching the filter, newest release first.
    ///
    /// Each filter clause is appended only when the corresponding field is
    /// set. Substring filters match case-insensitively; the verse-text filter
    /// joins against verses, so the select is deduplicated per song. A limit
    /// outside (0, 100] falls back to 10 and a non-positive offset is ignored.
    pub async fn songs(&self, filter: &SongFilter) -> Result<Vec<SongRow>, StorageError> {
        let mut sql = String::from(
            "SELECT DISTINCT s.song_id, g.name AS group_name, s.song AS song_name, \
             s.release_date, s.link \
             FROM songs s \
             JOIN groups g ON s.group_id = g.group_id \
             LEFT JOIN verses v ON s.song_id = v.song_id",
        );

        let mut clauses: Vec<&str> = Vec::new();
        let mut patterns: Vec<String> = Vec::new();

        if let Some(text) = &filter.song_text {
            clauses.push("LOWER(v.verse_text) LIKE LOWER(?)");
            patterns.push(format!("%{}%", text));
        }
        if let Some(group) = &filter.group_name {
            clauses.push("LOWER(g.name) LIKE LOWER(?)");
            patterns.push(format!("%{}%", group));
        }
        if let Some(song) = &filter.song_name {
            clauses.push("LOWER(s.song) LIKE LOWER(?)");
            patterns.push(format!("%{}%", song));
        }
        if filter.release_date.is_some() {
            clauses.push("s.release_date = ?");
        }

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        sql.push_str(" ORDER BY s.release_date DESC");

        let limit = if filter.limit > 0 && filter.limit <= MAX_SONG_LIMIT {
            filter.limit
        } else {
            DEFAULT_SONG_LIMIT
        };
        sql.push_str(&format!(" LIMIT {}", limit));

        if filter.offset > 0 {
            sql.push_str(&format!(" OFFSET {}", filter.offset));
        }

        let mut query = sqlx::query_as::<_, SongRow>(&sql);
        for pattern in &patterns {
            query = query.bind(pattern);
        }
        if let Some(date) = filter.release_date {
            query = query.bind(date);
        }

        let rows = query.fetch_all(&self.pool).await?;

        debug!(returned = rows.len(), "Fetched songs page");
        Ok(rows)
    }

    /// Count the verses of one song.
    pub async fn count_verses(&self, song_id: i64) -> Result<i64, StorageError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM verses WHERE song_id = ?")
            .bind(song_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Fetch one page of a song's verses in verse order.
    ///
    /// A non-positive limit falls back to 2; a non-positive offset is ignored.
    pub async fn verses(
        &self,
        song_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<VerseSmall>, StorageError> {
        let mut sql = String::from(
            "SELECT verse_number, verse_text FROM verses \
             WHERE song_id = ? ORDER BY verse_number ASC",
        );

        let limit = if limit > 0 { limit } else { DEFAULT_VERSE_LIMIT };
        sql.push_str(&format!(" LIMIT {}", limit));

        if offset > 0 {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        let verses = sqlx::query_as::<_, VerseSmall>(&sql)
            .bind(song_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(verses)
    }

    /// Insert a song with its verses, creating the group if needed.
    ///
    /// Runs as a single transaction bounded by a 30-second timeout: either
    /// the group/song/verse rows all land, or none do. A `(group, song)`
    /// collision surfaces as [`StorageError::DuplicateKey`].
    pub async fn add_song(&self, record: &NewSongRecord) -> Result<i64, StorageError> {
        match tokio::time::timeout(ADD_SONG_TIMEOUT, self.insert_song_tx(record)).await {
            Ok(result) => result,
            Err(_) => Err(StorageError::Timeout(ADD_SONG_TIMEOUT.as_secs())),
        }
    }

    async fn insert_song_tx(&self, record: &NewSongRecord) -> Result<i64, StorageError> {
        let mut tx = self.pool.begin().await?;

        // Insert-or-get the group: the RETURNING clause yields no row when
        // the name already exists, so fall back to a plain lookup.
        let inserted = sqlx::query_scalar::<_, i64>(
            "INSERT INTO groups (name) VALUES (?) ON CONFLICT(name) DO NOTHING RETURNING group_id",
        )
        .bind(&record.group_name)
        .fetch_optional(&mut *tx)
        .await?;

        let group_id = match inserted {
            Some(id) => id,
            None => {
                sqlx::query_scalar::<_, i64>("SELECT group_id FROM groups WHERE name = ?")
                    .bind(&record.group_name)
                    .fetch_one(&mut *tx)
                    .await?
            }
        };

        let song_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO songs (group_id, song, release_date, link) \
             VALUES (?, ?, ?, ?) RETURNING song_id",
        )
        .bind(group_id)
        .bind(&record.song_name)
        .bind(record.release_date)
        .bind(&record.link)
        .fetch_one(&mut *tx)
        .await?;

        if !record.verses.is_empty() {
            let mut sql =
                String::from("INSERT INTO verses (song_id, verse_number, verse_text) VALUES ");
            let placeholders: Vec<&str> = record.verses.iter().map(|_| "(?, ?, ?)").collect();
            sql.push_str(&placeholders.join(", "));

            let mut query = sqlx::query(&sql);
            for verse in &record.verses {
                query = query
                    .bind(song_id)
                    .bind(verse.verse_number)
                    .bind(&verse.verse_text);
            }
            query.execute(&mut *tx).await?;
        }

        tx.commit().await?;

        debug!(
            song_id,
            verses = record.verses.len(),
            "Inserted song with verses"
        );
        Ok(song_id)
    }

    /// Apply a partial update to a song row.
    ///
    /// Only the fields set in the patch appear in the SET clause. Zero rows
    /// affected maps to [`StorageError::RowNotFound`].
    pub async fn update_song(&self, song_id: i64, patch: &SongPatch) -> Result<(), StorageError> {
        let mut sets: Vec<&str> = Vec::new();
        if patch.group_id.is_some() {
            sets.push("group_id = ?");
        }
        if patch.song_name.is_some() {
            sets.push("song = ?");
        }
        if patch.release_date.is_some() {
            sets.push("release_date = ?");
        }
        if patch.link.is_some() {
            sets.push("link = ?");
        }

        if sets.is_empty() {
            return Ok(());
        }

        let mut sql = String::from("UPDATE songs SET ");
        sql.push_str(&sets.join(", "));
        sql.push_str(" WHERE song_id = ?");

        let mut query = sqlx::query(&sql);
        if let Some(group_id) = patch.group_id {
            query = query.bind(group_id);
        }
        if let Some(song_name) = &patch.song_name {
            query = query.bind(song_name);
        }
        if let Some(release_date) = patch.release_date {
            query = query.bind(release_date);
        }
        if let Some(link) = &patch.link {
            query = query.bind(link);
        }
        query = query.bind(song_id);

        let result = query.execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::RowNotFound);
        }

        debug!(song_id, "Updated song");
        Ok(())
    }

    /// Replace the text of one verse. Zero rows affected maps to
    /// [`StorageError::RowNotFound`].
    pub async fn update_verse(
        &self,
        song_id: i64,
        verse_number: i64,
        verse_text: &str,
    ) -> Result<(), StorageError> {
        let result =
            sqlx::query("UPDATE verses SET verse_text = ? WHERE song_id = ? AND verse_number = ?")
                .bind(verse_text)
                .bind(song_id)
                .bind(verse_number)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::RowNotFound);
        }

        debug!(song_id, verse_number, "Updated verse");
        Ok(())
    }

    /// Delete a song; its verses go with it. Zero rows affected maps to
    /// [`StorageError::RowNotFound`].
    pub async fn delete_song(&self, song_id: i64) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM songs WHERE song_id = ?")
            .bind(song_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::RowNotFound);
        }

        debug!(song_id, "Deleted song");
        Ok(())
    }

    /// Get the database pool (for advanced operations if needed)
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    async fn test_store() -> (SongStore, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("songs.db");
        let store = SongStore::new(db_path.to_str().unwrap(), 5, None)
            .await
            .unwrap();
        (store, dir)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(group: &str, song: &str, released: NaiveDate, verses: &[&str]) -> NewSongRecord {
        NewSongRecord {
            group_name: group.to_string(),
            song_name: song.to_string(),
            release_date: released,
            link: format!("https://example.com/{}", song.replace(' ', "-")),
            verses: verses
                .iter()
                .enumerate()
                .map(|(i, text)| VerseSmall {
                    verse_number: (i + 1) as i64,
                    verse_text: text.to_string(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_add_and_list_songs_newest_first() {
        let (store, _dir) = test_store().await;

        store
            .add_song(&record("Muse", "Uprising", date(2009, 9, 7), &["v1"]))
            .await
            .unwrap();
        store
            .add_song(&record(
                "Radiohead",
                "Creep",
                date(1992, 9, 21),
                &["v1", "v2"],
            ))
            .await
            .unwrap();

        let rows = store.songs(&SongFilter::default()).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].song_name, "Uprising");
        assert_eq!(rows[1].song_name, "Creep");
        assert_eq!(rows[0].group_name, "Muse");
        assert_eq!(rows[0].release_date, date(2009, 9, 7));

        assert_eq!(store.count_songs().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_add_song_without_verses() {
        let (store, _dir) = test_store().await;

        let song_id = store
            .add_song(&record("Muse", "Instrumental", date(2001, 1, 1), &[]))
            .await
            .unwrap();

        assert_eq!(store.count_verses(song_id).await.unwrap(), 0);
        assert_eq!(store.count_songs().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_add_song_reuses_existing_group() {
        let (store, _dir) = test_store().await;

        store
            .add_song(&record("Muse", "Uprising", date(2009, 9, 7), &["v1"]))
            .await
            .unwrap();
        store
            .add_song(&record("Muse", "Starlight", date(2006, 9, 4), &["v1"]))
            .await
            .unwrap();

        let groups = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM groups")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(groups, 1);
        assert!(store.group_id("Muse").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_song_is_rejected() {
        let (store, _dir) = test_store().await;

        let song = record("Muse", "Uprising", date(2009, 9, 7), &["v1"]);
        store.add_song(&song).await.unwrap();

        let err = store.add_song(&song).await.unwrap_err();
        assert!(matches!(err, StorageError::DuplicateKey));
        assert_eq!(store.count_songs().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_add_rolls_back_whole_transaction() {
        let (store, _dir) = test_store().await;

        // Two verses sharing one verse_number trip the uniqueness constraint
        // partway through the insert.
        let song = NewSongRecord {
            group_name: "Muse".to_string(),
            song_name: "Uprising".to_string(),
            release_date: date(2009, 9, 7),
            link: "https://example.com/uprising".to_string(),
            verses: vec![
                VerseSmall {
                    verse_number: 1,
                    verse_text: "a".to_string(),
                },
                VerseSmall {
                    verse_number: 1,
                    verse_text: "b".to_string(),
                },
            ],
        };

        let err = store.add_song(&song).await.unwrap_err();
        assert!(matches!(err, StorageError::DuplicateKey));

        assert_eq!(store.count_songs().await.unwrap(), 0);
        assert!(store.group_id("Muse").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_group_id_requires_exact_match() {
        let (store, _dir) = test_store().await;

        store
            .add_song(&record("Muse", "Uprising", date(2009, 9, 7), &[]))
            .await
            .unwrap();

        assert!(store.group_id("Muse").await.unwrap().is_some());
        assert!(store.group_id("muse").await.unwrap().is_none());
        assert!(store.group_id("Mus").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_filter_by_group_substring_case_insensitive() {
        let (store, _dir) = test_store().await;

        store
            .add_song(&record("Muse", "Uprising", date(2009, 9, 7), &["v"]))
            .await
            .unwrap();
        store
            .add_song(&record("Radiohead", "Creep", date(1992, 9, 21), &["v"]))
            .await
            .unwrap();

        let filter = SongFilter {
            group_name: Some("mUsE".to_string()),
            ..Default::default()
        };
        let rows = store.songs(&filter).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].group_name, "Muse");
    }

    #[tokio::test]
    async fn test_filter_by_song_name_substring() {
        let (store, _dir) = test_store().await;

        store
            .add_song(&record("Muse", "Supermassive Black Hole", date(2006, 6, 19), &["v"]))
            .await
            .unwrap();
        store
            .add_song(&record("Muse", "Starlight", date(2006, 9, 4), &["v"]))
            .await
            .unwrap();

        let filter = SongFilter {
            song_name: Some("black".to_string()),
            ..Default::default()
        };
        let rows = store.songs(&filter).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].song_name, "Supermassive Black Hole");
    }

    #[tokio::test]
    async fn test_filter_by_verse_text_dedupes_songs() {
        let (store, _dir) = test_store().await;

        store
            .add_song(&record(
                "Muse",
                "Uprising",
                date(2009, 9, 7),
                &["they will not force us", "they will not degrade us"],
            ))
            .await
            .unwrap();

        // Both verses match; the song must still come back once.
        let filter = SongFilter {
            song_text: Some("THEY WILL".to_string()),
            ..Default::default()
        };
        let rows = store.songs(&filter).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_filter_by_exact_release_date() {
        let (store, _dir) = test_store().await;

        store
            .add_song(&record("Muse", "Uprising", date(2009, 9, 7), &["v"]))
            .await
            .unwrap();
        store
            .add_song(&record("Muse", "Starlight", date(2006, 9, 4), &["v"]))
            .await
            .unwrap();

        let filter = SongFilter {
            release_date: Some(date(2006, 9, 4)),
            ..Default::default()
        };
        let rows = store.songs(&filter).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].song_name, "Starlight");
    }

    #[tokio::test]
    async fn test_filters_combine_with_and() {
        let (store, _dir) = test_store().await;

        store
            .add_song(&record("Muse", "Uprising", date(2009, 9, 7), &["v"]))
            .await
            .unwrap();
        store
            .add_song(&record("Muse", "Starlight", date(2006, 9, 4), &["v"]))
            .await
            .unwrap();
        store
            .add_song(&record("Radiohead", "Creep", date(1992, 9, 21), &["v"]))
            .await
            .unwrap();

        let filter = SongFilter {
            group_name: Some("muse".to_string()),
            song_name: Some("star".to_string()),
            ..Default::default()
        };
        let rows = store.songs(&filter).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].song_name, "Starlight");
    }

    #[tokio::test]
    async fn test_song_limit_clamps_to_default_outside_range() {
        let (store, _dir) = test_store().await;

        for i in 0..12 {
            store
                .add_song(&record(
                    "Muse",
                    &format!("Song {}", i),
                    date(2000 + i, 1, 1),
                    &[],
                ))
                .await
                .unwrap();
        }

        // limit 0 -> default 10
        let rows = store.songs(&SongFilter::default()).await.unwrap();
        assert_eq!(rows.len(), 10);

        // limit out of range -> default 10
        let filter = SongFilter {
            limit: 101,
            ..Default::default()
        };
        assert_eq!(store.songs(&filter).await.unwrap().len(), 10);

        let filter = SongFilter {
            limit: -3,
            ..Default::default()
        };
        assert_eq!(store.songs(&filter).await.unwrap().len(), 10);

        // in-range limits apply as given
        let filter = SongFilter {
            limit: 5,
            ..Default::default()
        };
        assert_eq!(store.songs(&filter).await.unwrap().len(), 5);

        let filter = SongFilter {
            limit: 100,
            ..Default::default()
        };
        assert_eq!(store.songs(&filter).await.unwrap().len(), 12);
    }

    #[tokio::test]
    async fn test_song_offset_applies_only_when_positive() {
        let (store, _dir) = test_store().await;

        store
            .add_song(&record("Muse", "Oldest", date(2000, 1, 1), &[]))
            .await
            .unwrap();
        store
            .add_song(&record("Muse", "Middle", date(2005, 1, 1), &[]))
            .await
            .unwrap();
        store
            .add_song(&record("Muse", "Newest", date(2010, 1, 1), &[]))
            .await
            .unwrap();

        let filter = SongFilter {
            offset: 1,
            ..Default::default()
        };
        let rows = store.songs(&filter).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].song_name, "Middle");

        let filter = SongFilter {
            offset: -5,
            ..Default::default()
        };
        assert_eq!(store.songs(&filter).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_verses_page_with_default_limit() {
        let (store, _dir) = test_store().await;

        let song_id = store
            .add_song(&record(
                "Muse",
                "Uprising",
                date(2009, 9, 7),
                &["one", "two", "three", "four", "five"],
            ))
            .await
            .unwrap();

        // limit <= 0 -> default 2
        let page = store.verses(song_id, 0, 0).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].verse_number, 1);
        assert_eq!(page[0].verse_text, "one");

        let page = store.verses(song_id, 3, 0).await.unwrap();
        assert_eq!(page.len(), 3);

        let page = store.verses(song_id, 10, 2).await.unwrap();
        assert_eq!(page.len(), 3);
        assert_eq!(page[0].verse_number, 3);
        assert_eq!(page[2].verse_text, "five");

        assert_eq!(store.count_verses(song_id).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_update_song_touches_only_supplied_fields() {
        let (store, _dir) = test_store().await;

        let song_id = store
            .add_song(&record("Muse", "Uprising", date(2009, 9, 7), &["v"]))
            .await
            .unwrap();

        let patch = SongPatch {
            link: Some("https://example.com/new".to_string()),
            ..Default::default()
        };
        store.update_song(song_id, &patch).await.unwrap();

        let rows = store.songs(&SongFilter::default()).await.unwrap();
        assert_eq!(rows[0].link, "https://example.com/new");
        assert_eq!(rows[0].song_name, "Uprising");
        assert_eq!(rows[0].group_name, "Muse");
        assert_eq!(rows[0].release_date, date(2009, 9, 7));
    }

    #[tokio::test]
    async fn test_update_song_can_move_between_groups() {
        let (store, _dir) = test_store().await;

        let song_id = store
            .add_song(&record("Muse", "Uprising", date(2009, 9, 7), &[]))
            .await
            .unwrap();
        store
            .add_song(&record("Radiohead", "Creep", date(1992, 9, 21), &[]))
            .await
            .unwrap();

        let radiohead = store.group_id("Radiohead").await.unwrap().unwrap();
        let patch = SongPatch {
            group_id: Some(radiohead),
            song_name: Some("Uprising (cover)".to_string()),
            ..Default::default()
        };
        store.update_song(song_id, &patch).await.unwrap();

        let filter = SongFilter {
            song_name: Some("cover".to_string()),
            ..Default::default()
        };
        let rows = store.songs(&filter).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].group_name, "Radiohead");
    }

    #[tokio::test]
    async fn test_update_missing_song_is_not_found() {
        let (store, _dir) = test_store().await;

        let patch = SongPatch {
            link: Some("https://example.com/x".to_string()),
            ..Default::default()
        };
        let err = store.update_song(9999, &patch).await.unwrap_err();
        assert!(matches!(err, StorageError::RowNotFound));
    }

    #[tokio::test]
    async fn test_update_verse_rewrites_text() {
        let (store, _dir) = test_store().await;

        let song_id = store
            .add_song(&record("Muse", "Uprising", date(2009, 9, 7), &["old", "two"]))
            .await
            .unwrap();

        store.update_verse(song_id, 1, "new text").await.unwrap();

        let page = store.verses(song_id, 10, 0).await.unwrap();
        assert_eq!(page[0].verse_text, "new text");
        assert_eq!(page[1].verse_text, "two");
    }

    #[tokio::test]
    async fn test_update_missing_verse_is_not_found() {
        let (store, _dir) = test_store().await;

        let song_id = store
            .add_song(&record("Muse", "Uprising", date(2009, 9, 7), &["v"]))
            .await
            .unwrap();

        let err = store.update_verse(song_id, 42, "text").await.unwrap_err();
        assert!(matches!(err, StorageError::RowNotFound));

        let err = store.update_verse(9999, 1, "text").await.unwrap_err();
        assert!(matches!(err, StorageError::RowNotFound));
    }

    #[tokio::test]
    async fn test_delete_song_cascades_to_verses() {
        let (store, _dir) = test_store().await;

        let song_id = store
            .add_song(&record("Muse", "Uprising", date(2009, 9, 7), &["v1", "v2"]))
            .await
            .unwrap();

        store.delete_song(song_id).await.unwrap();

        assert_eq!(store.count_songs().await.unwrap(), 0);
        assert_eq!(store.count_verses(song_id).await.unwrap(), 0);

        let err = store.delete_song(song_id).await.unwrap_err();
        assert!(matches!(err, StorageError::RowNotFound));
    }
}
