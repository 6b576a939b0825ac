//! Agent configuration structures
//!
//! Every field has a default so partial TOML/JSON files and partial
//! environments are valid.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    APP_DIR_NAME, DEFAULT_LEGACY_DB_PATH, DEFAULT_LEGACY_QUERY_TIMEOUT_SECS,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_REQUEST_TIMEOUT_SECS, QUEUE_FILE_NAME,
};

/// Top-level agent configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub legacy: LegacyConfig,
    pub sync: SyncConfig,
}

/// Where and how to reach the legacy database.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyConfig {
    pub db_path: PathBuf,
    /// Database password; provided by the environment, never logged.
    pub password: Option<String>,
    pub query_timeout_secs: u64,
}

impl Default for LegacyConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_LEGACY_DB_PATH),
            password: None,
            query_timeout_secs: DEFAULT_LEGACY_QUERY_TIMEOUT_SECS,
        }
    }
}

impl std::fmt::Debug for LegacyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegacyConfig")
            .field("db_path", &self.db_path)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("query_timeout_secs", &self.query_timeout_secs)
            .finish()
    }
}

impl LegacyConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

/// Polling cadence, remote timeouts and queue location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub poll_interval_ms: u64,
    pub request_timeout_secs: u64,
    pub queue_path: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            queue_path: default_queue_path(),
        }
    }
}

impl SyncConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Per-installation queue file location.
///
/// `%APPDATA%` on Windows, `$XDG_DATA_HOME` or `~/.local/share` elsewhere,
/// falling back to the working directory.
pub fn default_queue_path() -> PathBuf {
    let base = std::env::var_os("APPDATA")
        .or_else(|| std::env::var_os("XDG_DATA_HOME"))
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("share"))
        })
        .unwrap_or_else(|| PathBuf::from("."));
    base.join(APP_DIR_NAME).join(QUEUE_FILE_NAME)
}
