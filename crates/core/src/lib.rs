//! # OsLink Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The legacy row mapper
//! - Port/adapter interfaces (traits) for the legacy store, the remote API
//!   and the pending queue
//! - The sync service: send decision, poll cycle and queue drain
//!
//! ## Architecture Principles
//! - Only depends on `oslink-domain`
//! - No process, HTTP, or filesystem code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod mapper;
pub mod sync;

pub use mapper::{map_priority, map_status, row_to_order};
pub use sync::ports::{LegacyReader, OrderGateway, PendingQueue, RemoteEndpoint, UpsertOutcome};
pub use sync::{decide_action, SyncAction, SyncService, SyncSession};
