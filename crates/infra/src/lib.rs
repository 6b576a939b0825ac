//! # OsLink Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The PowerShell/OLE DB legacy reader
//! - The reqwest-based remote order gateway
//! - The JSON file pending queue
//! - The background sync agent and its lifecycle controls
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `oslink-core`
//! - Contains all "impure" code (processes, HTTP, filesystem)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod legacy;
pub mod queue;
pub mod sync;

// Re-export commonly used items
pub use api::{GatewayConfig, HttpOrderGateway};
pub use errors::InfraError;
pub use legacy::PowerShellReader;
pub use queue::JsonFileQueue;
pub use sync::{AgentStatus, StartOutcome, SyncAgent, SyncAgentConfig};
