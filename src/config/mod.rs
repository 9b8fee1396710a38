/// Configuration management for the bugdeck service
///
/// Handles server binding, database location and store operation limits.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Server port number
    pub port: u16,
}

/// Database configuration for the project document store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Directory holding the database file (default: "data")
    pub data_dir: String,
    /// Database file name inside `data_dir` (default: "projects.db")
    pub db_file: String,
    /// Upper bound on pooled SQLite connections
    pub max_connections: u32,
    /// Per-operation timeout in milliseconds, also used as the pool acquire timeout
    pub op_timeout_ms: u64,
}

impl DatabaseConfig {
    /// Full path of the database file
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.db_file)
    }

    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }
}

impl Default for Config {
    /// Default configuration with ENV_VAR support for container deployment
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("BUGDECK_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env_parsed("BUGDECK_PORT", 3000),
            },
            database: DatabaseConfig {
                data_dir: std::env::var("BUGDECK_DATA_DIR")
                    .unwrap_or_else(|_| "data".to_string()),
                db_file: std::env::var("BUGDECK_DB_FILE")
                    .unwrap_or_else(|_| "projects.db".to_string()),
                max_connections: env_parsed("BUGDECK_MAX_CONNECTIONS", 5),
                op_timeout_ms: env_parsed("BUGDECK_OP_TIMEOUT_MS", 5000),
            },
        }
    }
}

/// Read an env var and parse it, falling back on absence or parse failure
fn env_parsed<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(fallback)
}
