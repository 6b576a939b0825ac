//! Remote API views of service orders

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::order::LifecycleStatus;
use crate::constants::{marker_with_tag, KNOWN_MARKER_TAGS};

/// Order as listed by `GET /api/os`. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteOrder {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(default)]
    pub os_number: Option<String>,
    #[serde(default)]
    pub current_status: String,
    #[serde(default)]
    pub optional_description: Option<String>,
}

impl RemoteOrder {
    /// Parsed lifecycle status, `None` when the remote reports something
    /// this agent does not understand.
    pub fn status(&self) -> Option<LifecycleStatus> {
        self.current_status.parse().ok()
    }

    /// Whether this remote order is the counterpart of a legacy record,
    /// either by order number or by the marker embedded in its note.
    pub fn matches_external_id(&self, external_id: &str) -> bool {
        if self.os_number.as_deref() == Some(external_id) {
            return true;
        }
        let Some(note) = self.optional_description.as_deref() else {
            return false;
        };
        KNOWN_MARKER_TAGS
            .iter()
            .any(|tag| note.contains(&marker_with_tag(tag, external_id)))
    }
}

/// Remote ids are opaque; some deployments emit them as JSON numbers.
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

/// Envelope returned by the order listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderListResponse {
    #[serde(default)]
    pub orders: Vec<RemoteOrder>,
}

/// Partial update body for `PUT /api/os/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub current_status: LifecycleStatus,
    /// Stamped when completing, explicitly `null` otherwise.
    pub completed_at: Option<DateTime<Utc>>,
}

impl StatusUpdate {
    pub fn new(status: LifecycleStatus, now: DateTime<Utc>) -> Self {
        Self { current_status: status, completed_at: status.is_terminal().then_some(now) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(os_number: Option<&str>, note: Option<&str>) -> RemoteOrder {
        RemoteOrder {
            id: "r1".into(),
            os_number: os_number.map(str::to_string),
            current_status: "RECEIVED".into(),
            optional_description: note.map(str::to_string),
        }
    }

    #[test]
    fn matches_by_number_or_marker() {
        assert!(remote(Some("42"), None).matches_external_id("42"));
        assert!(remote(Some("900"), Some("[legacy:42] troca de tela")).matches_external_id("42"));
        assert!(!remote(Some("420"), Some("[legacy:420]")).matches_external_id("42"));
        assert!(!remote(None, None).matches_external_id("42"));
    }

    #[test]
    fn matches_marker_written_by_desktop_client() {
        assert!(remote(None, Some("[shoficina:42] troca de tela")).matches_external_id("42"));
        assert!(!remote(None, Some("[shoficina:420]")).matches_external_id("42"));
        assert!(!remote(None, Some("[outro:42]")).matches_external_id("42"));
    }

    #[test]
    fn list_response_tolerates_extra_fields() {
        let body = r#"{"orders":[{"id":"a","osNumber":"1","currentStatus":"WAITING","clientName":"X"}],"total":1}"#;
        let parsed: OrderListResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.orders.len(), 1);
        assert_eq!(parsed.orders[0].status(), Some(LifecycleStatus::Waiting));
    }

    #[test]
    fn numeric_ids_are_read_as_text() {
        let parsed: RemoteOrder =
            serde_json::from_str(r#"{"id":17,"osNumber":"9","currentStatus":"IN_PROGRESS"}"#).unwrap();
        assert_eq!(parsed.id, "17");
    }

    #[test]
    fn status_update_stamps_completion_only_when_completed() {
        let now = Utc::now();
        let done = serde_json::to_value(StatusUpdate::new(LifecycleStatus::Completed, now)).unwrap();
        assert_eq!(done["currentStatus"], "COMPLETED");
        assert!(done["completedAt"].is_string());

        let open = serde_json::to_value(StatusUpdate::new(LifecycleStatus::InProgress, now)).unwrap();
        assert!(open["completedAt"].is_null());
        assert!(open.as_object().unwrap().contains_key("completedAt"));
    }
}
