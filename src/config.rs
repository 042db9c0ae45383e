//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Song info lookup configuration
    pub songinfo: SongInfoConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite database location, with or without the `sqlite:` scheme
    pub url: String,
    /// Upper bound on pooled connections
    pub max_connections: u32,
    /// Optional per-connection lifetime in minutes
    pub max_lifetime_mins: Option<u64>,
}

/// Song info lookup configuration
#[derive(Debug, Clone)]
pub struct SongInfoConfig {
    /// Base URL of the external lookup service (no trailing `/info`)
    pub base_url: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:data/songs.db".to_string()),
                max_connections: env::var("DB_MAX_CONN")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
                max_lifetime_mins: env::var("DB_MAX_LIFETIME_MINS")
                    .ok()
                    .and_then(|v| v.parse().ok()),
            },
            songinfo: SongInfoConfig {
                // The default points back at this server's own /info endpoint.
                base_url: env::var("SONGINFO_BASE_URL")
                    .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string()),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
