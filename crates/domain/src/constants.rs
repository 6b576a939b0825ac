//! Application constants
//!
//! Centralized location for domain-level constants shared by the mapper,
//! the gateway and the sync engine.

// Legacy system identity
pub const LEGACY_MARKER_TAG: &str = "legacy";
/// Tags recognised when matching remote notes. `shoficina` was written by
/// the desktop client before the marker was made vendor neutral.
pub const KNOWN_MARKER_TAGS: &[&str] = &[LEGACY_MARKER_TAG, "shoficina"];
pub const DEFAULT_LEGACY_DB_PATH: &str = r"C:\SHARMAQ\SHOficina\dados.mdb";

// Row mapper fallbacks
pub const EQUIPMENT_SEPARATOR: &str = " — ";
pub const ACCESSORIES_SEPARATOR: &str = " | ";
pub const EQUIPMENT_PLACEHOLDER: &str = "Equipamento";
pub const CLIENT_PLACEHOLDER: &str = "Cliente SHOficina";
pub const ASSET_TAG_LABEL: &str = "Patrimônio";

// Timing defaults
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 8;
pub const DEFAULT_LEGACY_QUERY_TIMEOUT_SECS: u64 = 15;

// Remote API routes
pub const ORDERS_ENDPOINT: &str = "/api/os";

// Local persistence
pub const APP_DIR_NAME: &str = "oslink";
pub const QUEUE_FILE_NAME: &str = "pending_orders.json";

/// Marker embedded in the remote note so the link to the legacy record
/// survives remote id changes.
pub fn legacy_marker(external_id: &str) -> String {
    marker_with_tag(LEGACY_MARKER_TAG, external_id)
}

pub fn marker_with_tag(tag: &str, external_id: &str) -> String {
    format!("[{tag}:{external_id}]")
}
