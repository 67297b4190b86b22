//! Explicit store configuration.
//!
//! # Responsibility
//! - Describe where the SQLite store lives and how connections wait on locks.
//! - Build that description from process environment at startup.
//!
//! # Invariants
//! - Configuration is a plain value handed to `db::open_store`; there is no
//!   process-wide connection or engine handle.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

/// Environment key for the database file path (`:memory:` selects in-memory).
pub const DB_PATH_ENV: &str = "STUDYBUD_DB_PATH";
/// Environment key for the SQLite busy timeout in milliseconds.
pub const DB_BUSY_TIMEOUT_ENV: &str = "STUDYBUD_DB_BUSY_TIMEOUT_MS";

const DEFAULT_DB_FILE_NAME: &str = "db.sqlite";
const IN_MEMORY_MARKER: &str = ":memory:";
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the store is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// SQLite database file, created on first open.
    File(PathBuf),
    /// Private in-memory database; contents vanish with the connection.
    Memory,
}

/// Connection settings supplied to the storage layer at process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub location: StoreLocation,
    /// How long a writer waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            location: StoreLocation::File(PathBuf::from(DEFAULT_DB_FILE_NAME)),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

impl StoreConfig {
    /// Configuration for a file-backed store with default timeouts.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: StoreLocation::File(path.into()),
            ..Self::default()
        }
    }

    /// Configuration for an in-memory store with default timeouts.
    pub fn in_memory() -> Self {
        Self {
            location: StoreLocation::Memory,
            ..Self::default()
        }
    }

    /// Reads configuration from process environment.
    ///
    /// # Errors
    /// - Returns an error when a present variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// Missing keys fall back to defaults; blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = non_blank(lookup(DB_PATH_ENV)) {
            config.location = if raw == IN_MEMORY_MARKER {
                StoreLocation::Memory
            } else {
                StoreLocation::File(PathBuf::from(raw))
            };
        }

        if let Some(raw) = non_blank(lookup(DB_BUSY_TIMEOUT_ENV)) {
            let millis = raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: DB_BUSY_TIMEOUT_ENV,
                value: raw.clone(),
            })?;
            config.busy_timeout = Duration::from_millis(millis);
        }

        Ok(config)
    }
}

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value `{value}` for `{key}`")
            }
        }
    }
}

impl Error for ConfigError {}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}
