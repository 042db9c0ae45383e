//! Song catalog API handlers
//!
//! Binds HTTP query/path/body parameters into typed requests, delegates to
//! the catalog service, and shapes the responses. Malformed input is turned
//! into a validation error here and never reaches the domain layer.

use crate::catalog::models::{Song, SongFilter, SongPage, VersePage};
use crate::catalog::service::{CatalogService, UpdateSongRequest, RELEASE_DATE_FORMAT};
use crate::error::AppError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Query parameters for listing songs.
#[derive(Debug, Deserialize, Default)]
pub struct ListSongsQuery {
    /// Group-name substring filter.
    pub group: Option<String>,
    /// Song-name substring filter.
    pub song: Option<String>,
    /// Verse-text substring filter.
    pub text: Option<String>,
    /// Exact release date, `DD.MM.YYYY`.
    #[serde(rename = "releaseDate")]
    pub release_date: Option<String>,
    /// Page size; values outside the accepted range fall back to the default.
    pub limit: Option<i64>,
    /// Rows to skip; non-positive values are ignored.
    pub offset: Option<i64>,
}

/// Query parameters for paging a song's verses.
#[derive(Debug, Deserialize, Default)]
pub struct VersesQuery {
    /// Page size; non-positive values fall back to the default.
    pub limit: Option<i64>,
    /// Verses to skip; non-positive values are ignored.
    pub offset: Option<i64>,
}

/// Body of a partial song update. Unknown keys are rejected.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct UpdateSongBody {
    /// New group name; the group must already exist.
    pub group: Option<String>,
    /// New song title.
    pub song: Option<String>,
    /// New release date, `DD.MM.YYYY`.
    #[serde(rename = "releaseDate")]
    pub release_date: Option<String>,
    /// New link.
    pub link: Option<String>,
}

/// Body of a verse update.
#[derive(Debug, Deserialize)]
pub struct UpdateVerseBody {
    /// Verse to replace, 1-based.
    #[serde(rename = "verseNumber")]
    pub verse_number: i64,
    /// Replacement text.
    #[serde(rename = "verseText")]
    pub verse_text: String,
}

/// Body of a song ingestion request. Both fields are required.
#[derive(Debug, Deserialize)]
pub struct NewSongBody {
    /// Performing group.
    pub group: String,
    /// Song title.
    pub song: String,
}

/// Response carrying only a success flag; failures return an error body.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    /// Always `true`.
    pub success: bool,
}

/// GET /api/v1/songs - List songs with optional filters and paging
pub async fn list_songs(
    State(catalog): State<Arc<CatalogService>>,
    query: Result<Query<ListSongsQuery>, QueryRejection>,
) -> Result<Json<SongPage>, AppError> {
    let Query(params) = query.map_err(|e| AppError::Validation(e.to_string()))?;

    let release_date = parse_release_date(params.release_date.as_deref())?;

    let filter = SongFilter {
        group_name: params.group,
        song_name: params.song,
        song_text: params.text,
        release_date,
        limit: params.limit.unwrap_or(0),
        offset: params.offset.unwrap_or(0),
    };

    let page = catalog.fetch_songs(filter).await?;
    Ok(Json(page))
}

/// GET /api/v1/songs/:id - Page through a song's verses
pub async fn get_verses(
    State(catalog): State<Arc<CatalogService>>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<VersesQuery>, QueryRejection>,
) -> Result<Json<VersePage>, AppError> {
    let Path(song_id) = path.map_err(|_| invalid_song_id())?;
    let Query(params) = query.map_err(|e| AppError::Validation(e.to_string()))?;

    let page = catalog
        .fetch_verses(
            song_id,
            params.limit.unwrap_or(0),
            params.offset.unwrap_or(0),
        )
        .await?;
    Ok(Json(page))
}

/// DELETE /api/v1/songs/:id - Remove a song and its verses
pub async fn delete_song(
    State(catalog): State<Arc<CatalogService>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let Path(song_id) = path.map_err(|_| invalid_song_id())?;

    catalog.delete_song(song_id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// PATCH /api/v1/songs/:id - Update any subset of a song's fields
pub async fn update_song(
    State(catalog): State<Arc<CatalogService>>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateSongBody>, JsonRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let Path(song_id) = path.map_err(|_| invalid_song_id())?;
    let Json(body) = body.map_err(|e| AppError::Validation(e.to_string()))?;

    let release_date = parse_release_date(body.release_date.as_deref())?;

    let request = UpdateSongRequest {
        group_name: body.group,
        song_name: body.song,
        release_date,
        link: body.link,
    };

    catalog.update_song(song_id, request).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// PATCH /api/v1/songs/:id/verse - Replace the text of one verse
pub async fn update_verse(
    State(catalog): State<Arc<CatalogService>>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateVerseBody>, JsonRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let Path(song_id) = path.map_err(|_| invalid_song_id())?;
    let Json(body) = body.map_err(|e| AppError::Validation(e.to_string()))?;

    catalog
        .update_verse(song_id, body.verse_number, &body.verse_text)
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/v1/songs/new - Ingest a song via the external lookup
pub async fn new_song(
    State(catalog): State<Arc<CatalogService>>,
    body: Result<Json<NewSongBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Song>), AppError> {
    let Json(body) = body.map_err(|e| AppError::Validation(e.to_string()))?;

    let song = catalog.new_song(&body.group, &body.song).await?;
    Ok((StatusCode::CREATED, Json(song)))
}

/// Parse an optional `DD.MM.YYYY` date.
fn parse_release_date(raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match raw {
        Some(value) => NaiveDate::parse_from_str(value, RELEASE_DATE_FORMAT)
            .map(Some)
            .map_err(|_| AppError::BadDataFormat),
        None => Ok(None),
    }
}

fn invalid_song_id() -> AppError {
    AppError::Validation("invalid song id".to_string())
}
