//! Sync service - core synchronization logic
//!
//! Owns the session state and the three ports. One poll cycle reads the
//! legacy store, maps every row and sends it; every send that cannot reach
//! the remote side lands in the pending queue, and every cycle ends with a
//! queue drain. The scheduling around it lives in the infra crate.

use std::sync::Arc;

use chrono::Utc;
use oslink_domain::{CanonicalOrder, OsLinkError, Result};
use tracing::{debug, error, info, instrument, warn};

use super::decision::{decide_action, SkipReason, SyncAction};
use super::ports::{LegacyReader, OrderGateway, PendingQueue, UpsertOutcome};
use super::query::changed_orders_query;
use super::session::SyncSession;
use crate::mapper::row_to_order;

/// Result of sending one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Created,
    Updated,
    Skipped(SkipReason),
    /// Remote unreachable or session incomplete; the order is pending.
    Queued,
}

/// Per-outcome counters for a batch of sends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendTally {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub queued: usize,
}

impl SendTally {
    pub fn record(&mut self, outcome: SendOutcome) {
        match outcome {
            SendOutcome::Created => self.created += 1,
            SendOutcome::Updated => self.updated += 1,
            SendOutcome::Skipped(_) => self.skipped += 1,
            SendOutcome::Queued => self.queued += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.created + self.updated + self.skipped + self.queued
    }
}

/// Summary of one poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Rows returned by the legacy store.
    pub rows: usize,
    /// Rows without an external id.
    pub discarded: usize,
    pub polled: SendTally,
    pub drained: SendTally,
}

/// Legacy-to-remote synchronization service
pub struct SyncService {
    reader: Arc<dyn LegacyReader>,
    gateway: Arc<dyn OrderGateway>,
    queue: Arc<dyn PendingQueue>,
    session: SyncSession,
}

impl SyncService {
    /// Create a new sync service with an empty session
    pub fn new(
        reader: Arc<dyn LegacyReader>,
        gateway: Arc<dyn OrderGateway>,
        queue: Arc<dyn PendingQueue>,
    ) -> Self {
        Self { reader, gateway, queue, session: SyncSession::new() }
    }

    pub fn session(&self) -> &SyncSession {
        &self.session
    }

    pub fn set_running(&mut self, running: bool) {
        self.session.set_running(running);
    }

    /// Whether the legacy store exists on this host.
    pub fn is_legacy_available(&self) -> bool {
        self.reader.is_available()
    }

    pub async fn pending_count(&self) -> usize {
        self.queue.len().await
    }

    /// Record the credentials handed over by the host application.
    pub fn set_credentials(&mut self, server_url: &str, token: &str) {
        self.session.set_server_url(server_url);
        self.session.set_token(token);
    }

    pub fn update_server_url(&mut self, server_url: &str) {
        self.session.set_server_url(server_url);
    }

    /// Replace the bearer token; a non-empty token flushes the queue right
    /// away since it usually means the app session reconnected.
    pub async fn update_token(&mut self, token: &str) -> SendTally {
        self.session.set_token(token);
        if self.session.has_token() {
            self.drain_queue().await
        } else {
            SendTally::default()
        }
    }

    /// Run one poll cycle.
    ///
    /// A legacy-store failure aborts the cycle before anything else happens:
    /// the watermark stays put, nothing is queued and no remote call is
    /// made.
    #[instrument(skip(self))]
    pub async fn poll_cycle(&mut self) -> Result<CycleReport> {
        let since = self.session.watermark_date();
        let rows = self.reader.query(&changed_orders_query(since)).await?;

        // Coarse watermark: overlapping re-reads are absorbed by the
        // lookup-before-create in `send`.
        self.session.advance_watermark(Utc::now());

        let mut report = CycleReport { rows: rows.len(), ..CycleReport::default() };
        for row in &rows {
            match row_to_order(row) {
                Some(order) => report.polled.record(self.send(order).await),
                None => report.discarded += 1,
            }
        }

        report.drained = self.drain_queue().await;

        if report.rows > 0 || report.drained.total() > 0 {
            info!(
                %since,
                rows = report.rows,
                discarded = report.discarded,
                created = report.polled.created + report.drained.created,
                updated = report.polled.updated + report.drained.updated,
                queued = report.polled.queued + report.drained.queued,
                "Poll cycle completed"
            );
        } else {
            debug!(%since, "Poll cycle found no changes");
        }

        Ok(report)
    }

    /// Retry every pending order once. Successful sends remove their own
    /// entries and failing ones re-queue themselves, so the loop keeps no
    /// bookkeeping of its own.
    pub async fn drain_queue(&self) -> SendTally {
        let mut tally = SendTally::default();
        if self.session.endpoint().is_none() {
            return tally;
        }

        let entries = self.queue.snapshot().await;
        if entries.is_empty() {
            return tally;
        }

        info!(count = entries.len(), "Draining pending order queue");
        for entry in entries {
            tally.record(self.send(entry).await);
        }
        tally
    }

    /// Deliver one order: look it up, then create, update or skip. Never
    /// fails; anything that does not reach the remote side is queued.
    #[instrument(skip(self, order), fields(external_id = %order.external_id, status = %order.status))]
    pub async fn send(&self, order: CanonicalOrder) -> SendOutcome {
        let Some(endpoint) = self.session.endpoint() else {
            debug!("No app session; queueing order");
            return self.enqueue(order).await;
        };

        let existing = match self.gateway.find_by_external_id(&endpoint, &order.external_id).await {
            Ok(existing) => existing,
            Err(err) => return self.queue_after_failure(order, &err, "lookup").await,
        };

        match decide_action(existing.as_ref(), order.status) {
            SyncAction::Create => match self.gateway.create(&endpoint, order.payload()).await {
                Ok(remote_id) => {
                    info!(
                        remote_id = remote_id.as_deref().unwrap_or("unknown"),
                        client = %order.payload.client_name,
                        "Order created remotely"
                    );
                    self.queue.remove(&order.external_id).await;
                    SendOutcome::Created
                }
                Err(err) => self.queue_after_failure(order, &err, "create").await,
            },
            SyncAction::Update { remote_id, status } => {
                match self.gateway.update_status(&endpoint, &remote_id, status).await {
                    Ok(()) => {
                        info!(%remote_id, "Order status updated remotely");
                        self.queue.remove(&order.external_id).await;
                        SendOutcome::Updated
                    }
                    Err(err) => self.queue_after_failure(order, &err, "update").await,
                }
            }
            SyncAction::Skip(reason) => {
                debug!(?reason, "Remote already up to date");
                // The remote holds this state or a later one, so nothing
                // queued for this id is still pending.
                self.queue.remove(&order.external_id).await;
                SendOutcome::Skipped(reason)
            }
        }
    }

    /// Outages are expected and only warned about; anything else (a bad
    /// server URL, say) will not heal on its own and is logged as an error.
    async fn queue_after_failure(
        &self,
        order: CanonicalOrder,
        err: &OsLinkError,
        step: &'static str,
    ) -> SendOutcome {
        if err.is_remote_unavailable() {
            warn!(error = %err, kind = err.label(), step, "Remote call failed; queueing order");
        } else {
            error!(error = %err, kind = err.label(), step, "Remote call misconfigured; queueing order");
        }
        self.enqueue(order).await
    }

    async fn enqueue(&self, order: CanonicalOrder) -> SendOutcome {
        let external_id = order.external_id.clone();
        match self.queue.upsert(order).await {
            UpsertOutcome::Inserted => debug!(%external_id, "Order added to pending queue"),
            UpsertOutcome::Replaced => debug!(%external_id, "Pending order refreshed"),
            UpsertOutcome::Unchanged => {}
        }
        SendOutcome::Queued
    }
}
