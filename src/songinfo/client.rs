//! Song info HTTP client
//!
//! Direct HTTP client for the external song info service. Given a group and
//! song name it calls `GET {base_url}/info?group=..&song=..` and maps the
//! response into a typed [`SongInfo`] or an [`InfoError`] kind.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::songinfo::error::InfoError;

/// Payload returned by the song info service
///
/// `release_date` arrives as a `DD.MM.YYYY` string and `text` may carry
/// literal `\n` two-character sequences in place of line breaks; both are
/// interpreted by the catalog service, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongInfo {
    /// Release date string, format `DD.MM.YYYY`
    #[serde(rename = "releaseDate")]
    pub release_date: String,
    /// Full lyric text, blank lines separating verses
    pub text: String,
    /// Media link for the song
    pub link: String,
}

/// Client for the external song info service
///
/// Holds a pooled `reqwest::Client` and the service base URL. The base URL
/// is injectable so tests can point the client at a mock server. Cheap to
/// clone; safe to share across concurrent requests.
#[derive(Debug, Clone)]
pub struct SongInfoClient {
    http: reqwest::Client,
    base_url: String,
}

impl SongInfoClient {
    /// Create a client for the service at `base_url` (no trailing `/info`)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch release date, lyric text, and link for a (group, song) pair
    ///
    /// # Errors
    /// * `GroupNameRequired` / `SongNameRequired` if an input is empty
    ///   (checked before any network call)
    /// * `ServiceInternal` on transport failure or a 500 response
    /// * `ServiceBadRequest` on a 400 response
    /// * `Deserialize` if a 200 body cannot be parsed
    /// * `ServiceUnknown` for any other status code
    pub async fn fetch_song_info(
        &self,
        group_name: &str,
        song_name: &str,
    ) -> Result<SongInfo, InfoError> {
        if group_name.is_empty() {
            return Err(InfoError::GroupNameRequired);
        }
        if song_name.is_empty() {
            return Err(InfoError::SongNameRequired);
        }

        let url = format!("{}/info", self.base_url);

        tracing::debug!(
            url = %url,
            group = %group_name,
            song = %song_name,
            "Fetching song info"
        );

        let response = self
            .http
            .get(&url)
            .query(&[("group", group_name), ("song", song_name)])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(url = %url, error = %e, "Song info request failed to send");
                InfoError::ServiceInternal
            })?;

        match response.status() {
            StatusCode::OK => response.json::<SongInfo>().await.map_err(|e| {
                tracing::error!(error = %e, "Failed to decode song info body");
                InfoError::Deserialize
            }),
            StatusCode::BAD_REQUEST => Err(InfoError::ServiceBadRequest),
            StatusCode::INTERNAL_SERVER_ERROR => Err(InfoError::ServiceInternal),
            other => {
                tracing::error!(status = other.as_u16(), "Unexpected song info status");
                Err(InfoError::ServiceUnknown(other.as_u16()))
            }
        }
    }
}
