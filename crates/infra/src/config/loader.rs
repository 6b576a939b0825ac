//! Configuration loader
//!
//! Loads agent configuration from a config file and environment variables.
//!
//! ## Loading Strategy
//! 1. Probes a few locations for `oslink.toml` / `oslink.json`
//! 2. Falls back to built-in defaults when no file exists
//! 3. Overlays any `OSLINK_*` environment variables on top
//!
//! Every field has a default, so an empty environment with no file is a
//! valid configuration.
//!
//! ## Environment Variables
//! - `OSLINK_LEGACY_DB_PATH`: Legacy Access database file
//! - `OSLINK_LEGACY_DB_PASSWORD`: Legacy database password
//! - `OSLINK_LEGACY_TIMEOUT_SECS`: Hard timeout for one legacy query
//! - `OSLINK_POLL_INTERVAL_MS`: Poll interval in milliseconds
//! - `OSLINK_REQUEST_TIMEOUT_SECS`: Remote API timeout in seconds
//! - `OSLINK_QUEUE_PATH`: Pending queue file
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./oslink.toml` or `./oslink.json` (current working directory)
//! 2. Next to the executable

use std::path::{Path, PathBuf};

use oslink_domain::{AgentConfig, OsLinkError, Result};

pub const ENV_LEGACY_DB_PATH: &str = "OSLINK_LEGACY_DB_PATH";
pub const ENV_LEGACY_DB_PASSWORD: &str = "OSLINK_LEGACY_DB_PASSWORD";
pub const ENV_LEGACY_TIMEOUT_SECS: &str = "OSLINK_LEGACY_TIMEOUT_SECS";
pub const ENV_POLL_INTERVAL_MS: &str = "OSLINK_POLL_INTERVAL_MS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "OSLINK_REQUEST_TIMEOUT_SECS";
pub const ENV_QUEUE_PATH: &str = "OSLINK_QUEUE_PATH";

const CONFIG_FILE_NAMES: [&str; 2] = ["oslink.toml", "oslink.json"];

/// Load configuration: probed file (or defaults) with environment overrides.
///
/// # Errors
/// Returns `OsLinkError::Config` if a probed file cannot be read or parsed,
/// or an environment variable holds an invalid number.
pub fn load() -> Result<AgentConfig> {
    let base = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("No config file found, using defaults");
            AgentConfig::default()
        }
    };
    apply_env_overrides(base)
}

/// Load configuration from environment variables over built-in defaults.
///
/// # Errors
/// Returns `OsLinkError::Config` if a numeric variable cannot be parsed.
pub fn load_from_env() -> Result<AgentConfig> {
    apply_env_overrides(AgentConfig::default())
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. TOML or JSON is
/// detected by file extension.
///
/// # Errors
/// Returns `OsLinkError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<AgentConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(OsLinkError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            OsLinkError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| OsLinkError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, format chosen by extension.
fn parse_config(contents: &str, path: &Path) -> Result<AgentConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| OsLinkError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| OsLinkError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(OsLinkError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing `oslink.{toml,json}` in the working directory or next to
/// the executable.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

fn apply_env_overrides(mut config: AgentConfig) -> Result<AgentConfig> {
    if let Some(path) = env_string(ENV_LEGACY_DB_PATH) {
        config.legacy.db_path = PathBuf::from(path);
    }
    if let Some(password) = std::env::var(ENV_LEGACY_DB_PASSWORD).ok() {
        config.legacy.password = Some(password).filter(|p| !p.is_empty());
    }
    if let Some(secs) = env_number(ENV_LEGACY_TIMEOUT_SECS)? {
        config.legacy.query_timeout_secs = secs;
    }
    if let Some(ms) = env_number(ENV_POLL_INTERVAL_MS)? {
        config.sync.poll_interval_ms = ms;
    }
    if let Some(secs) = env_number(ENV_REQUEST_TIMEOUT_SECS)? {
        config.sync.request_timeout_secs = secs;
    }
    if let Some(path) = env_string(ENV_QUEUE_PATH) {
        config.sync.queue_path = PathBuf::from(path);
    }
    Ok(config)
}

/// Non-blank environment variable, trimmed.
fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Optional positive integer variable.
///
/// # Errors
/// Returns `OsLinkError::Config` for non-numeric or zero values.
fn env_number(key: &str) -> Result<Option<u64>> {
    let Some(raw) = env_string(key) else {
        return Ok(None);
    };
    match raw.parse::<u64>() {
        Ok(0) => Err(OsLinkError::Config(format!("{key} must be greater than zero"))),
        Ok(value) => Ok(Some(value)),
        Err(e) => Err(OsLinkError::Config(format!("Invalid {key} value {raw:?}: {e}"))),
    }
}
