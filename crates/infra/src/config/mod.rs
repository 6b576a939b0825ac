//! Configuration loading
//!
//! Loads agent configuration from `oslink.{toml,json}` and `OSLINK_*`
//! environment variables.

pub mod loader;

// Re-export commonly used items
pub use loader::{load, load_from_env, load_from_file, probe_config_paths};
