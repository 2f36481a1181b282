//! Configuration module for the family points backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Persist a zero record when an unknown member is fetched
    pub persist_on_fetch: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AddrParseError> {
        dotenvy::dotenv().ok();

        let db_path = env::var("FAMILY_POINTS_DB_PATH")
            .unwrap_or_else(|_| "./data/family_points.sqlite".to_string())
            .into();

        let bind_addr = env::var("FAMILY_POINTS_BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:5000".to_string())
            .parse()?;

        let log_level = env::var("FAMILY_POINTS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let persist_on_fetch = env::var("FAMILY_POINTS_PERSIST_ON_FETCH")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            persist_on_fetch,
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
