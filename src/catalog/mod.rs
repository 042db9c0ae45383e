//! Catalog module
//!
//! Groups, songs, and verses: SQLite-backed storage plus the domain service
//! that orchestrates it with the external song info lookup.

pub mod db;
pub mod models;
pub mod service;

pub use db::{SongStore, StorageError};
pub use models::{NewSongRecord, Song, SongFilter, SongPatch, SongPage, VersePage, VerseSmall};
pub use service::{CatalogService, UpdateSongRequest};
