//! Lookup-specific error types
//!
//! Outcomes of a song info lookup that callers can branch on. The split
//! matters at the transport boundary: empty-input kinds are the caller's
//! fault, the rest are upstream or transport failures.

use thiserror::Error;

/// Errors that can occur while fetching song info
#[derive(Error, Debug)]
pub enum InfoError {
    /// The group name was empty (checked before any network call)
    #[error("group name is required")]
    GroupNameRequired,

    /// The song name was empty (checked before any network call)
    #[error("song name is required")]
    SongNameRequired,

    /// The request could not be sent, or the service answered 500
    #[error("song info service internal error")]
    ServiceInternal,

    /// The service answered 400
    #[error("song info service rejected the request")]
    ServiceBadRequest,

    /// The service answered 200 but the body did not match the expected shape
    #[error("song info service returned an unreadable body")]
    Deserialize,

    /// The service answered a status this client has no contract for
    #[error("song info service returned unexpected status {0}")]
    ServiceUnknown(u16),
}
