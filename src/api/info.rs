//! Built-in song info endpoint
//!
//! Serves the same contract the external lookup service exposes, with canned
//! song details. Useful for local runs: point `SONGINFO_BASE_URL` at this
//! server and song ingestion round-trips without any external dependency.

use crate::error::AppError;
use crate::songinfo::SongInfo;
use axum::extract::Query;
use axum::Json;
use serde::Deserialize;

/// Query parameters of the info endpoint.
#[derive(Debug, Deserialize, Default)]
pub struct InfoQuery {
    /// Performing group.
    pub group: Option<String>,
    /// Song title.
    pub song: Option<String>,
}

/// GET /info - Canned song details for local development
pub async fn song_info(Query(params): Query<InfoQuery>) -> Result<Json<SongInfo>, AppError> {
    let group = params.group.unwrap_or_default();
    let song = params.song.unwrap_or_default();

    if group.is_empty() && song.is_empty() {
        return Err(AppError::Validation(
            "group and song are required".to_string(),
        ));
    }

    Ok(Json(SongInfo {
        release_date: "16.07.2006".to_string(),
        text: "Ooh baby, don't you know I suffer?\\nOoh baby, can you hear me moan?\\nYou caught me under false pretenses\\nHow long before you let me go?\\n\\nOoh\\nYou set my soul alight\\nOoh\\nYou set my soul alight".to_string(),
        link: "https://www.youtube.com/watch?v=Xsp3_a-PMTw".to_string(),
    }))
}
