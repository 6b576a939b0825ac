//! Domain types and models

pub mod legacy;
pub mod order;
pub mod remote;

pub use legacy::{columns, LegacyRow};
pub use order::{CanonicalOrder, LifecycleStatus, OrderPayload, Priority, QueueEntry};
pub use remote::{OrderListResponse, RemoteOrder, StatusUpdate};
