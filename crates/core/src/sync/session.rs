//! Sync session state
//!
//! Owned by exactly one `SyncService`; mutated only through the engine's
//! control operations.

use chrono::{DateTime, Local, NaiveDate, Utc};

use super::ports::RemoteEndpoint;

#[derive(Clone, Default)]
pub struct SyncSession {
    server_url: Option<String>,
    bearer_token: Option<String>,
    last_poll: Option<DateTime<Utc>>,
    running: bool,
}

impl std::fmt::Debug for SyncSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSession")
            .field("server_url", &self.server_url)
            .field("has_token", &self.bearer_token.is_some())
            .field("last_poll", &self.last_poll)
            .field("running", &self.running)
            .finish()
    }
}

impl SyncSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_server_url(&mut self, server_url: &str) {
        self.server_url = non_blank(server_url);
    }

    pub fn set_token(&mut self, token: &str) {
        self.bearer_token = non_blank(token);
    }

    pub fn has_token(&self) -> bool {
        self.bearer_token.is_some()
    }

    pub fn server_url(&self) -> Option<&str> {
        self.server_url.as_deref()
    }

    /// Both URL and token, or `None` while disconnected from the app
    /// session.
    pub fn endpoint(&self) -> Option<RemoteEndpoint> {
        match (&self.server_url, &self.bearer_token) {
            (Some(server_url), Some(bearer_token)) => Some(RemoteEndpoint {
                server_url: server_url.clone(),
                bearer_token: bearer_token.clone(),
            }),
            _ => None,
        }
    }

    pub fn last_poll(&self) -> Option<DateTime<Utc>> {
        self.last_poll
    }

    /// Watermarks only move forward.
    pub fn advance_watermark(&mut self, now: DateTime<Utc>) {
        if self.last_poll.map_or(true, |previous| now > previous) {
            self.last_poll = Some(now);
        }
    }

    /// Local calendar date the next poll starts from. The epoch before the
    /// first successful poll.
    pub fn watermark_date(&self) -> NaiveDate {
        self.last_poll
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
            .with_timezone(&Local)
            .date_naive()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
