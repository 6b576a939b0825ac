//! In-memory `PendingQueue`
//!
//! Same dedup semantics as the file-backed queue without persistence. Used
//! by service tests and by hosts that do not need restart durability.

use async_trait::async_trait;
use oslink_domain::QueueEntry;
use parking_lot::Mutex;

use super::ports::{PendingQueue, UpsertOutcome};

#[derive(Debug, Default)]
pub struct InMemoryQueue {
    entries: Mutex<Vec<QueueEntry>>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<QueueEntry>) -> Self {
        Self { entries: Mutex::new(entries) }
    }
}

/// Shared dedup rule: one entry per external id, replaced only when the
/// status differs.
pub fn upsert_entry(entries: &mut Vec<QueueEntry>, entry: QueueEntry) -> UpsertOutcome {
    match entries.iter_mut().find(|existing| existing.external_id == entry.external_id) {
        None => {
            entries.push(entry);
            UpsertOutcome::Inserted
        }
        Some(existing) if existing.status != entry.status => {
            *existing = entry;
            UpsertOutcome::Replaced
        }
        Some(_) => UpsertOutcome::Unchanged,
    }
}

/// Shared removal rule; returns whether an entry was dropped.
pub fn remove_entry(entries: &mut Vec<QueueEntry>, external_id: &str) -> bool {
    let before = entries.len();
    entries.retain(|entry| entry.external_id != external_id);
    entries.len() != before
}

#[async_trait]
impl PendingQueue for InMemoryQueue {
    async fn snapshot(&self) -> Vec<QueueEntry> {
        self.entries.lock().clone()
    }

    async fn upsert(&self, entry: QueueEntry) -> UpsertOutcome {
        upsert_entry(&mut self.entries.lock(), entry)
    }

    async fn remove(&self, external_id: &str) -> bool {
        remove_entry(&mut self.entries.lock(), external_id)
    }

    async fn len(&self) -> usize {
        self.entries.lock().len()
    }
}
