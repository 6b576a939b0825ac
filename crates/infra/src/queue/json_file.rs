//! File-backed `PendingQueue`.
//!
//! The queue is a pretty-printed JSON array of flattened order payloads plus
//! the `_externalId` / `_status` shadow fields. It is loaded once at startup
//! and rewritten atomically (temp file + rename) after every mutation. The
//! rewrite runs on the blocking pool so an fsync never stalls a runtime
//! worker.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use oslink_core::sync::memory::{remove_entry, upsert_entry};
use oslink_core::{PendingQueue, UpsertOutcome};
use oslink_domain::{OsLinkError, QueueEntry, Result};
use parking_lot::Mutex;
use tempfile::NamedTempFile;
use tokio::task;
use tracing::{debug, error, warn};

use crate::errors::InfraError;

/// Durable queue persisted to a single JSON file.
///
/// The in-memory list is authoritative. A failed write is logged and the
/// next successful mutation brings the file back in line.
///
/// Mutations are serialized by `writer` for the whole mutate-then-write
/// sequence, so files land in mutation order. Readers only take the short
/// `entries` lock and never wait on disk.
#[derive(Debug)]
pub struct JsonFileQueue {
    path: PathBuf,
    entries: Mutex<Vec<QueueEntry>>,
    writer: tokio::sync::Mutex<()>,
}

impl JsonFileQueue {
    /// Open the queue at `path`. A missing file is an empty queue; an
    /// unreadable or corrupt file is logged and also treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match load_entries(&path) {
            Ok(entries) => {
                debug!(path = %path.display(), pending = entries.len(), "pending queue loaded");
                entries
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "pending queue unreadable, starting empty");
                Vec::new()
            }
        };
        Self { path, entries: Mutex::new(entries), writer: tokio::sync::Mutex::new(()) }
    }

    async fn persist(&self, entries: Vec<QueueEntry>) {
        let path = self.path.clone();
        let result = task::spawn_blocking(move || save_entries(&path, &entries))
            .await
            .unwrap_or_else(|err| {
                Err(OsLinkError::Internal(format!("queue write task failed: {err}")))
            });
        if let Err(err) = result {
            error!(path = %self.path.display(), error = %err, "failed to persist pending queue");
        }
    }
}

#[async_trait]
impl PendingQueue for JsonFileQueue {
    async fn snapshot(&self) -> Vec<QueueEntry> {
        self.entries.lock().clone()
    }

    async fn upsert(&self, entry: QueueEntry) -> UpsertOutcome {
        let _writer = self.writer.lock().await;
        let (outcome, changed) = {
            let mut entries = self.entries.lock();
            let outcome = upsert_entry(&mut entries, entry);
            (outcome, (outcome != UpsertOutcome::Unchanged).then(|| entries.clone()))
        };
        if let Some(entries) = changed {
            self.persist(entries).await;
        }
        outcome
    }

    async fn remove(&self, external_id: &str) -> bool {
        let _writer = self.writer.lock().await;
        let changed = {
            let mut entries = self.entries.lock();
            remove_entry(&mut entries, external_id).then(|| entries.clone())
        };
        let removed = changed.is_some();
        if let Some(entries) = changed {
            self.persist(entries).await;
        }
        removed
    }

    async fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

fn load_entries(path: &Path) -> Result<Vec<QueueEntry>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(InfraError::from(err).into()),
    };
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&raw).map_err(|err| InfraError::from(err).into())
}

fn save_entries(path: &Path, entries: &[QueueEntry]) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(InfraError::from)?;

    let json = serde_json::to_vec_pretty(entries).map_err(InfraError::from)?;
    let mut tmp = NamedTempFile::new_in(parent).map_err(InfraError::from)?;
    tmp.write_all(&json).map_err(InfraError::from)?;
    tmp.as_file().sync_all().map_err(InfraError::from)?;
    tmp.persist(path)
        .map_err(|err| OsLinkError::Persistence(format!("atomic rename failed: {}", err.error)))?;
    Ok(())
}
