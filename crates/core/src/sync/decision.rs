//! Create / update / skip decision for one order
//!
//! Both freshly polled rows and queued retries go through this function, so
//! the monotonic status guard and the idempotent-create rule live here only.

use oslink_domain::{LifecycleStatus, RemoteOrder};

/// What the engine should do with an incoming order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// No remote counterpart exists.
    Create,
    /// The remote counterpart exists and lags behind.
    Update { remote_id: String, status: LifecycleStatus },
    /// The remote already reflects this state or a later one.
    Skip(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    RemoteCompleted,
    NotAdvancing,
    /// Remote status outside the known lifecycle; left untouched.
    UnknownRemoteStatus,
}

/// Decide the action for `incoming` given the remote lookup result.
pub fn decide_action(existing: Option<&RemoteOrder>, incoming: LifecycleStatus) -> SyncAction {
    let Some(remote) = existing else {
        return SyncAction::Create;
    };

    match remote.status() {
        None => SyncAction::Skip(SkipReason::UnknownRemoteStatus),
        Some(current) if current.is_terminal() => SyncAction::Skip(SkipReason::RemoteCompleted),
        Some(current) if incoming.advances(current) => {
            SyncAction::Update { remote_id: remote.id.clone(), status: incoming }
        }
        Some(_) => SyncAction::Skip(SkipReason::NotAdvancing),
    }
}
