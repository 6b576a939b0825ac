//! Background sync agent with explicit lifecycle management.
//!
//! Wraps [`SyncService`] in a recurring poll loop. The service sits behind an
//! async mutex so the loop's cycles and the host's token/URL updates run on a
//! single timeline: a drain triggered by `update_token` never interleaves
//! with a poll cycle.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use oslink_core::SyncService;
//! use oslink_domain::AgentConfig;
//! use oslink_infra::api::{GatewayConfig, HttpOrderGateway};
//! use oslink_infra::legacy::PowerShellReader;
//! use oslink_infra::queue::JsonFileQueue;
//! use oslink_infra::sync::{SyncAgent, SyncAgentConfig};
//!
//! # async fn example() -> oslink_domain::Result<()> {
//! let config = AgentConfig::default();
//! let service = SyncService::new(
//!     Arc::new(PowerShellReader::new(&config.legacy)),
//!     Arc::new(HttpOrderGateway::new(GatewayConfig::default())?),
//!     Arc::new(JsonFileQueue::open(&config.sync.queue_path)),
//! );
//! let mut agent = SyncAgent::new(service, SyncAgentConfig::from(&config.sync));
//!
//! agent.start("https://os.example.com", "token").await;
//! // ... application runs ...
//! agent.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use oslink_core::sync::SendTally;
use oslink_core::SyncService;
use oslink_domain::SyncConfig;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::errors::{AgentError, AgentResult};

/// Configuration for the sync agent.
#[derive(Debug, Clone)]
pub struct SyncAgentConfig {
    /// Interval between poll cycles
    pub poll_interval: Duration,
    /// Join timeout when stopping
    pub join_timeout: Duration,
}

impl Default for SyncAgentConfig {
    fn default() -> Self {
        Self::from(&SyncConfig::default())
    }
}

impl From<&SyncConfig> for SyncAgentConfig {
    fn from(config: &SyncConfig) -> Self {
        Self { poll_interval: config.poll_interval(), join_timeout: Duration::from_secs(5) }
    }
}

/// What `start` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The loop was spawned.
    Started,
    /// Already running; only the credentials were replaced.
    CredentialsUpdated,
    /// No legacy store on this host; sync stays off.
    Disabled,
}

/// Point-in-time view for the host UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatus {
    pub running: bool,
    pub pending: usize,
    pub last_poll: Option<DateTime<Utc>>,
}

/// Recurring legacy-to-remote sync loop.
pub struct SyncAgent {
    service: Arc<Mutex<SyncService>>,
    config: SyncAgentConfig,
    cancellation: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
    unavailable_logged: bool,
}

impl SyncAgent {
    pub fn new(service: SyncService, config: SyncAgentConfig) -> Self {
        Self {
            service: Arc::new(Mutex::new(service)),
            config,
            cancellation: CancellationToken::new(),
            task_handle: None,
            unavailable_logged: false,
        }
    }

    /// Begin syncing with the given credentials.
    ///
    /// On a host without the legacy store this does nothing (logged once per
    /// agent). Otherwise the loop drains the queue, polls once right away and
    /// then every `poll_interval`. Calling it while running only swaps the
    /// credentials.
    #[instrument(skip(self, token))]
    pub async fn start(&mut self, server_url: &str, token: &str) -> StartOutcome {
        if self.is_running() {
            self.service.lock().await.set_credentials(server_url, token);
            debug!("Sync agent already running; credentials updated");
            return StartOutcome::CredentialsUpdated;
        }

        let mut service = self.service.lock().await;
        if !service.is_legacy_available() {
            if !self.unavailable_logged {
                info!("Legacy database not found on this host; sync disabled");
                self.unavailable_logged = true;
            }
            return StartOutcome::Disabled;
        }

        service.set_credentials(server_url, token);
        service.set_running(true);
        drop(service);

        info!(poll_interval_ms = self.config.poll_interval.as_millis(), "Starting sync agent");

        self.cancellation = CancellationToken::new();
        let service = Arc::clone(&self.service);
        let poll_interval = self.config.poll_interval;
        let cancel = self.cancellation.clone();

        self.task_handle = Some(tokio::spawn(async move {
            Self::run_loop(service, poll_interval, cancel).await;
        }));

        StartOutcome::Started
    }

    /// Stop the loop and wait up to `join_timeout` for it to exit. A cycle
    /// already in progress is allowed to finish. Stopping a stopped agent is
    /// a no-op.
    ///
    /// On timeout the loop is still winding down; the handle is kept so
    /// `is_running` stays truthful and a later `stop` can join it.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> AgentResult<()> {
        let Some(mut handle) = self.task_handle.take() else {
            return Ok(());
        };

        info!("Stopping sync agent");
        self.cancellation.cancel();

        // The loop clears the session's running flag itself on exit, so the
        // service lock is never needed here.
        match tokio::time::timeout(self.config.join_timeout, &mut handle).await {
            Ok(Ok(())) => {
                info!("Sync agent stopped");
                Ok(())
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Sync loop task failed");
                Err(AgentError::TaskJoinFailed(e.to_string()))
            }
            Err(_) => {
                warn!(timeout = ?self.config.join_timeout, "Sync loop did not complete within timeout");
                self.task_handle = Some(handle);
                Err(AgentError::StopTimeout { timeout: self.config.join_timeout })
            }
        }
    }

    /// Returns true while the loop task is alive.
    pub fn is_running(&self) -> bool {
        self.task_handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Replace the bearer token. A non-empty token drains the queue
    /// immediately, whether or not the loop is running.
    #[instrument(skip(self, token))]
    pub async fn update_token(&self, token: &str) -> SendTally {
        let tally = self.service.lock().await.update_token(token).await;
        if tally.total() > 0 {
            info!(
                created = tally.created,
                updated = tally.updated,
                skipped = tally.skipped,
                queued = tally.queued,
                "Pending orders drained after token update"
            );
        }
        tally
    }

    pub async fn update_server_url(&self, server_url: &str) {
        self.service.lock().await.update_server_url(server_url);
    }

    pub async fn status(&self) -> AgentStatus {
        let service = self.service.lock().await;
        AgentStatus {
            running: self.is_running(),
            pending: service.pending_count().await,
            last_poll: service.session().last_poll(),
        }
    }

    /// Background loop: drain once, then poll on every tick (the first tick
    /// fires immediately).
    async fn run_loop(
        service: Arc<Mutex<SyncService>>,
        poll_interval: Duration,
        cancel: CancellationToken,
    ) {
        let drained = service.lock().await.drain_queue().await;
        if drained.total() > 0 {
            info!(sent = drained.total() - drained.queued, still_pending = drained.queued, "Startup drain finished");
        }

        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("Sync loop cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    Self::run_cycle(&service).await;
                }
            }
        }

        service.lock().await.set_running(false);
    }

    async fn run_cycle(service: &Arc<Mutex<SyncService>>) {
        let started = Instant::now();
        let result = service.lock().await.poll_cycle().await;

        match result {
            Ok(report) => {
                debug!(
                    rows = report.rows,
                    discarded = report.discarded,
                    created = report.polled.created,
                    updated = report.polled.updated,
                    skipped = report.polled.skipped,
                    queued = report.polled.queued,
                    drained = report.drained.total(),
                    elapsed_ms = started.elapsed().as_millis(),
                    "Poll cycle finished"
                );
            }
            Err(e) => {
                error!(error = %e, "Poll cycle aborted; legacy store unreadable");
            }
        }
    }
}

impl Drop for SyncAgent {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("SyncAgent dropped while running; cancelling loop");
            self.cancellation.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use oslink_core::sync::InMemoryQueue;
    use oslink_core::{LegacyReader, OrderGateway, PendingQueue, RemoteEndpoint};
    use oslink_domain::{
        CanonicalOrder, LegacyRow, LifecycleStatus, OrderPayload, OsLinkError, Priority,
        RemoteOrder, Result,
    };

    use super::*;

    struct StubReader {
        available: bool,
        queries: AtomicUsize,
    }

    #[async_trait]
    impl LegacyReader for StubReader {
        fn is_available(&self) -> bool {
            self.available
        }

        async fn query(&self, _sql: &str) -> Result<Vec<LegacyRow>> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            Ok(vec![LegacyRow::new().with("CODIGO", "1").with("SITUACAO", "Aguardando peça")])
        }
    }

    #[derive(Default)]
    struct StubGateway {
        offline: AtomicBool,
        creates: AtomicUsize,
        last_token: parking_lot::Mutex<Option<String>>,
    }

    #[async_trait]
    impl OrderGateway for StubGateway {
        async fn find_by_external_id(
            &self,
            endpoint: &RemoteEndpoint,
            _external_id: &str,
        ) -> Result<Option<RemoteOrder>> {
            *self.last_token.lock() = Some(endpoint.bearer_token.clone());
            if self.offline.load(Ordering::SeqCst) {
                return Err(OsLinkError::Network("offline".into()));
            }
            Ok(None)
        }

        async fn create(
            &self,
            _endpoint: &RemoteEndpoint,
            _payload: &OrderPayload,
        ) -> Result<Option<String>> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }

        async fn update_status(
            &self,
            _endpoint: &RemoteEndpoint,
            _remote_id: &str,
            _status: LifecycleStatus,
        ) -> Result<()> {
            Ok(())
        }
    }

    /// Reader whose query outlives a short join timeout.
    struct SlowReader {
        delay: Duration,
    }

    #[async_trait]
    impl LegacyReader for SlowReader {
        fn is_available(&self) -> bool {
            true
        }

        async fn query(&self, _sql: &str) -> Result<Vec<LegacyRow>> {
            tokio::time::sleep(self.delay).await;
            Ok(Vec::new())
        }
    }

    fn queued(id: &str) -> CanonicalOrder {
        CanonicalOrder::new(OrderPayload {
            external_id: id.into(),
            client_name: "Cliente SHOficina".into(),
            equipment_description: "Equipamento".into(),
            serial_number: None,
            accessories_note: None,
            has_prior_defect: false,
            prior_defect_text: None,
            freeform_note: format!("[legacy:{id}]"),
            priority: Priority::Medium,
            lifecycle_status: LifecycleStatus::Received,
        })
    }

    fn agent(
        available: bool,
        gateway: Arc<StubGateway>,
        queue: Arc<InMemoryQueue>,
    ) -> (SyncAgent, Arc<StubReader>) {
        let reader = Arc::new(StubReader { available, queries: AtomicUsize::new(0) });
        let service = SyncService::new(reader.clone(), gateway, queue);
        let config = SyncAgentConfig {
            poll_interval: Duration::from_millis(40),
            join_timeout: Duration::from_secs(2),
        };
        (SyncAgent::new(service, config), reader)
    }

    #[tokio::test]
    async fn start_without_legacy_store_is_disabled() {
        let gateway = Arc::new(StubGateway::default());
        let (mut agent, reader) = agent(false, gateway.clone(), Arc::new(InMemoryQueue::new()));

        assert_eq!(agent.start("http://srv", "tok").await, StartOutcome::Disabled);
        assert_eq!(agent.start("http://srv", "tok").await, StartOutcome::Disabled);
        assert!(!agent.is_running());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(reader.queries.load(Ordering::SeqCst), 0);
        assert_eq!(gateway.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn start_polls_immediately_and_repeats() {
        let gateway = Arc::new(StubGateway::default());
        let (mut agent, reader) = agent(true, gateway.clone(), Arc::new(InMemoryQueue::new()));

        assert_eq!(agent.start("http://srv", "tok").await, StartOutcome::Started);
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(reader.queries.load(Ordering::SeqCst) >= 2);
        assert!(gateway.creates.load(Ordering::SeqCst) >= 1);

        let status = agent.status().await;
        assert!(status.running);
        assert!(status.last_poll.is_some());

        agent.stop().await.unwrap();
        assert!(!agent.status().await.running);
        assert!(!agent.service.lock().await.session().is_running());
    }

    #[tokio::test]
    async fn start_drains_queue_before_polling() {
        let gateway = Arc::new(StubGateway::default());
        let queue = Arc::new(InMemoryQueue::with_entries(vec![queued("7")]));
        let (mut agent, _reader) = agent(true, gateway.clone(), queue.clone());

        agent.start("http://srv", "tok").await;
        tokio::time::sleep(Duration::from_millis(60)).await;
        agent.stop().await.unwrap();

        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn second_start_only_updates_credentials() {
        let gateway = Arc::new(StubGateway::default());
        let (mut agent, _reader) = agent(true, gateway.clone(), Arc::new(InMemoryQueue::new()));

        agent.start("http://srv", "old").await;
        assert_eq!(agent.start("http://srv", "new").await, StartOutcome::CredentialsUpdated);
        tokio::time::sleep(Duration::from_millis(100)).await;
        agent.stop().await.unwrap();

        assert_eq!(gateway.last_token.lock().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let gateway = Arc::new(StubGateway::default());
        let (mut agent, reader) = agent(true, gateway, Arc::new(InMemoryQueue::new()));

        agent.stop().await.unwrap();
        agent.start("http://srv", "tok").await;
        agent.stop().await.unwrap();
        agent.stop().await.unwrap();

        let polls = reader.queries.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(reader.queries.load(Ordering::SeqCst), polls);
    }

    #[tokio::test]
    async fn update_token_drains_even_when_stopped() {
        let gateway = Arc::new(StubGateway::default());
        gateway.offline.store(true, Ordering::SeqCst);
        let queue = Arc::new(InMemoryQueue::new());
        let (agent, _reader) = agent(true, gateway.clone(), queue.clone());

        queue.upsert(queued("3")).await;
        agent.update_server_url("http://srv").await;
        assert_eq!(agent.update_token("").await, SendTally::default());

        gateway.offline.store(false, Ordering::SeqCst);
        let tally = agent.update_token("fresh").await;
        assert_eq!(tally.created, 1);
        assert!(queue.is_empty().await);
        assert_eq!(agent.status().await.pending, 0);
    }

    #[tokio::test]
    async fn stop_is_bounded_by_join_timeout_during_slow_cycle() {
        let reader = Arc::new(SlowReader { delay: Duration::from_millis(800) });
        let service = SyncService::new(
            reader,
            Arc::new(StubGateway::default()),
            Arc::new(InMemoryQueue::new()),
        );
        let join_timeout = Duration::from_millis(100);
        let mut agent = SyncAgent::new(
            service,
            SyncAgentConfig { poll_interval: Duration::from_secs(60), join_timeout },
        );

        agent.start("http://srv", "tok").await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        let started = Instant::now();
        let result = agent.stop().await;
        assert!(started.elapsed() < Duration::from_millis(500), "stop took {:?}", started.elapsed());
        assert!(matches!(result, Err(AgentError::StopTimeout { timeout }) if timeout == join_timeout));
        assert!(agent.is_running());

        // The in-flight cycle finishes and a second stop joins cleanly.
        tokio::time::sleep(Duration::from_millis(900)).await;
        agent.stop().await.unwrap();
        assert!(!agent.is_running());
        assert!(!agent.service.lock().await.session().is_running());
    }
}
