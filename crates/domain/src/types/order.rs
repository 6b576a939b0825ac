//! Canonical service-order model
//!
//! `OrderPayload` is exactly what the remote API receives. `CanonicalOrder`
//! wraps it together with the internal shadow fields used for matching and
//! queue deduplication; those fields never reach the wire because the
//! gateway only accepts `OrderPayload`.

use serde::{Deserialize, Serialize};

use crate::impl_wire_enum_conversions;

/// Lifecycle of a service order.
///
/// Variant order defines the monotonic progression used by the status
/// guard: `Received < Waiting < InProgress < Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleStatus {
    Received,
    Waiting,
    InProgress,
    Completed,
}

impl_wire_enum_conversions!(LifecycleStatus {
    Received => "RECEIVED",
    Waiting => "WAITING",
    InProgress => "IN_PROGRESS",
    Completed => "COMPLETED",
});

impl LifecycleStatus {
    /// Terminal state; nothing may follow it.
    pub fn is_terminal(self) -> bool {
        self == Self::Completed
    }

    /// True when `self` strictly follows `other` in the lifecycle.
    pub fn advances(self, other: Self) -> bool {
        self > other
    }
}

/// Order priority as understood by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Urgent,
    High,
    #[default]
    Medium,
    Low,
}

impl_wire_enum_conversions!(Priority {
    Urgent => "URGENT",
    High => "HIGH",
    Medium => "MEDIUM",
    Low => "LOW",
});

/// Public order payload submitted to `POST /api/os`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    #[serde(rename = "osNumber")]
    pub external_id: String,
    pub client_name: String,
    #[serde(rename = "equipmentName")]
    pub equipment_description: String,
    pub serial_number: Option<String>,
    #[serde(rename = "accessories")]
    pub accessories_note: Option<String>,
    #[serde(rename = "hasPreviousDefect")]
    pub has_prior_defect: bool,
    #[serde(rename = "previousDefectDescription")]
    pub prior_defect_text: Option<String>,
    #[serde(rename = "optionalDescription")]
    pub freeform_note: String,
    pub priority: Priority,
    #[serde(rename = "currentStatus")]
    pub lifecycle_status: LifecycleStatus,
}

/// Canonical order plus its internal shadow fields.
///
/// Serialized flat, which is also the on-disk queue entry format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalOrder {
    #[serde(flatten)]
    pub payload: OrderPayload,
    #[serde(rename = "_externalId")]
    pub external_id: String,
    #[serde(rename = "_status")]
    pub status: LifecycleStatus,
}

impl CanonicalOrder {
    /// Wrap a payload, deriving the shadow fields from it.
    pub fn new(payload: OrderPayload) -> Self {
        let external_id = payload.external_id.clone();
        let status = payload.lifecycle_status;
        Self { payload, external_id, status }
    }

    /// The part of the order that may be sent to the remote API.
    pub fn payload(&self) -> &OrderPayload {
        &self.payload
    }
}

/// A pending, not yet confirmed delivered, order snapshot.
pub type QueueEntry = CanonicalOrder;
