//! API module
//!
//! Contains HTTP request handlers for the song catalog endpoints

pub mod info;
pub mod songs;
