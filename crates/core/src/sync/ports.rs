//! Port interfaces for sync operations

use async_trait::async_trait;
use oslink_domain::{LegacyRow, LifecycleStatus, OrderPayload, QueueEntry, RemoteOrder, Result};

/// Credentials for one remote API call, taken from the live session so
/// token and URL changes apply to the very next request.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteEndpoint {
    pub server_url: String,
    pub bearer_token: String,
}

impl std::fmt::Debug for RemoteEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteEndpoint")
            .field("server_url", &self.server_url)
            .field("bearer_token", &"<redacted>")
            .finish()
    }
}

/// Read-only access to the legacy order store.
#[async_trait]
pub trait LegacyReader: Send + Sync {
    /// Whether the legacy store exists on this host at all. When it does not,
    /// sync is permanently disabled for the installation.
    fn is_available(&self) -> bool;

    /// Run a query and return its rows. An empty result is `Ok(vec![])`;
    /// locked, missing or mis-keyed stores are `Err(OsLinkError::Legacy)`.
    async fn query(&self, sql: &str) -> Result<Vec<LegacyRow>>;
}

/// Remote order-management API.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Locate the remote counterpart of a legacy record. `Ok(None)` when the
    /// remote is reachable but has no match.
    async fn find_by_external_id(
        &self,
        endpoint: &RemoteEndpoint,
        external_id: &str,
    ) -> Result<Option<RemoteOrder>>;

    /// Create a remote order, returning its remote id when the response
    /// carries one.
    async fn create(
        &self,
        endpoint: &RemoteEndpoint,
        payload: &OrderPayload,
    ) -> Result<Option<String>>;

    /// Move a remote order to `status`, stamping or clearing its completion
    /// time.
    async fn update_status(
        &self,
        endpoint: &RemoteEndpoint,
        remote_id: &str,
        status: LifecycleStatus,
    ) -> Result<()>;
}

/// Effect of a queue upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
    Unchanged,
}

/// Ordered, deduplicated set of orders awaiting delivery.
///
/// Implementations persist on every mutation; persistence failures are
/// logged by the implementation and never surface here.
#[async_trait]
pub trait PendingQueue: Send + Sync {
    /// Ordered copy of the current entries.
    async fn snapshot(&self) -> Vec<QueueEntry>;

    /// Insert, replace on status change, or ignore an identical status.
    async fn upsert(&self, entry: QueueEntry) -> UpsertOutcome;

    /// Drop the entry for `external_id`; returns whether one existed.
    async fn remove(&self, external_id: &str) -> bool;

    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
