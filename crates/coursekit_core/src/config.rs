//! Host-supplied runtime configuration.
//!
//! # Responsibility
//! - Carry database location and logging settings from the host process.
//! - Offer one-call bootstrap helpers over `open_db` and `init_logging`.
//!
//! # Invariants
//! - The core never reads config files or environment variables itself.
//! - Missing fields fall back to `CatalogConfig::default()`.

use crate::db::{open_db, DbResult};
use crate::logging::{default_log_level, init_logging, LoggingError};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_DB_FILE_NAME: &str = "coursekit.sqlite3";

/// Runtime settings for one host process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` disables file logging.
    pub log_dir: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CatalogConfig {
    /// Starts file logging when `log_dir` is set.
    ///
    /// # Errors
    /// Same as `init_logging`.
    pub fn init_logging(&self) -> Result<(), LoggingError> {
        match self.log_dir.as_deref() {
            Some(dir) => init_logging(&self.log_level, dir),
            None => Ok(()),
        }
    }

    /// Opens and migrates the configured database file.
    pub fn open_connection(&self) -> DbResult<Connection> {
        open_db(&self.db_path)
    }
}
