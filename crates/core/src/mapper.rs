//! Legacy row to canonical order mapping
//!
//! Pure and total: no I/O, no state, same row in gives the same order out.
//! The only rejection is a row without an external id, which is discarded.

use oslink_domain::constants::{
    legacy_marker, ACCESSORIES_SEPARATOR, ASSET_TAG_LABEL, CLIENT_PLACEHOLDER,
    EQUIPMENT_PLACEHOLDER, EQUIPMENT_SEPARATOR,
};
use oslink_domain::{columns, CanonicalOrder, LegacyRow, LifecycleStatus, OrderPayload, Priority};

/// Completion flag value the legacy system writes when an order is done.
const DONE_FLAG: &str = "S";

const COMPLETED_HINTS: [&str; 3] = ["conclu", "pronto", "entreg"];
const IN_PROGRESS_HINTS: [&str; 3] = ["andamento", "execu", "reparo"];
const WAITING_HINTS: [&str; 2] = ["aguard", "espera"];

/// Derive the lifecycle status from the free-text situation and the
/// completion flag. The flag wins over the text.
pub fn map_status(situation: Option<&str>, completion_flag: Option<&str>) -> LifecycleStatus {
    if completion_flag.is_some_and(|flag| flag.trim().eq_ignore_ascii_case(DONE_FLAG)) {
        return LifecycleStatus::Completed;
    }

    let Some(text) = situation else {
        return LifecycleStatus::Received;
    };
    let text = text.trim().to_lowercase();
    let contains_any = |hints: &[&str]| hints.iter().any(|hint| text.contains(hint));

    if contains_any(&COMPLETED_HINTS) {
        LifecycleStatus::Completed
    } else if contains_any(&IN_PROGRESS_HINTS) {
        LifecycleStatus::InProgress
    } else if contains_any(&WAITING_HINTS) {
        LifecycleStatus::Waiting
    } else {
        LifecycleStatus::Received
    }
}

/// Map the legacy priority code. Unknown or absent codes are `Medium`.
pub fn map_priority(code: Option<&str>) -> Priority {
    let Some(code) = code else {
        return Priority::Medium;
    };
    let code = code.trim().to_lowercase();

    if code == "s" || code == "1" || code.contains("urg") {
        Priority::Urgent
    } else if code.contains("alta") || code == "2" {
        Priority::High
    } else if code.contains("baixa") || code == "4" {
        Priority::Low
    } else {
        Priority::Medium
    }
}

/// Build the canonical order for a legacy row, or `None` when the row has
/// no external id.
pub fn row_to_order(row: &LegacyRow) -> Option<CanonicalOrder> {
    let external_id = row.non_empty(columns::CODE)?.to_string();

    let equipment = join_present(
        [row.text(columns::EQUIPMENT), row.text(columns::BRAND), row.text(columns::MODEL)],
        EQUIPMENT_SEPARATOR,
    )
    .unwrap_or_else(|| EQUIPMENT_PLACEHOLDER.to_string());

    let asset_tag = row.non_empty(columns::ASSET_TAG).map(|tag| format!("{ASSET_TAG_LABEL}: {tag}"));
    let accessories = join_present(
        [row.text(columns::ACCESSORIES), asset_tag.as_deref().unwrap_or_default()],
        ACCESSORIES_SEPARATOR,
    );

    let defect = row.non_empty(columns::DEFECT).map(str::to_string);

    let mut note = legacy_marker(&external_id);
    if let Some(observation) = row.non_empty(columns::SERVICE_NOTE) {
        note.push(' ');
        note.push_str(observation);
    }

    let client_name = row
        .non_empty(columns::CLIENT_NAME)
        .or_else(|| row.non_empty(columns::CLIENT_CODE))
        .unwrap_or(CLIENT_PLACEHOLDER)
        .to_string();

    let status = map_status(row.non_empty(columns::SITUATION), row.non_empty(columns::READY));
    let priority = map_priority(row.non_empty(columns::PRIORITY));

    Some(CanonicalOrder::new(OrderPayload {
        external_id,
        client_name,
        equipment_description: equipment,
        serial_number: row.non_empty(columns::SERIAL).map(str::to_string),
        accessories_note: accessories,
        has_prior_defect: defect.is_some(),
        prior_defect_text: defect,
        freeform_note: note,
        priority,
        lifecycle_status: status,
    }))
}

fn join_present<const N: usize>(parts: [&str; N], separator: &str) -> Option<String> {
    let present: Vec<&str> = parts.into_iter().filter(|part| !part.is_empty()).collect();
    (!present.is_empty()).then(|| present.join(separator))
}
