//! Legacy-to-remote order synchronization

pub mod decision;
pub mod memory;
pub mod ports;
pub mod query;
pub mod service;
pub mod session;

pub use decision::{decide_action, SkipReason, SyncAction};
pub use memory::InMemoryQueue;
pub use ports::{LegacyReader, OrderGateway, PendingQueue, RemoteEndpoint, UpsertOutcome};
pub use query::changed_orders_query;
pub use service::{CycleReport, SendOutcome, SendTally, SyncService};
pub use session::SyncSession;
