//! JSON output formatting.

use serde_json::json;
use tablekit_core::storage::{Page, WriteOutcome};
use tablekit_core::table::TableDescription;
use tablekit_core::value::{item_to_json, Item};

use crate::loader::LoadSummary;

/// Format a value as JSON.
pub fn format_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// An optional item: the document, or `null`.
pub fn item(item: Option<&Item>) -> serde_json::Value {
    item.map(item_to_json).unwrap_or(serde_json::Value::Null)
}

/// A page with its counts and continuation key.
pub fn page(page: &Page) -> serde_json::Value {
    json!({
        "items": page.items.iter().map(item_to_json).collect::<Vec<_>>(),
        "count": page.count,
        "scannedCount": page.scanned_count,
        "lastEvaluatedKey": page.last_evaluated_key.as_ref().map(item_to_json),
    })
}

/// A write outcome: `applied` plus the returned attributes or the
/// condition failure message.
pub fn outcome(outcome: &WriteOutcome<Option<Item>>) -> serde_json::Value {
    match outcome {
        WriteOutcome::Applied(attributes) => json!({
            "applied": true,
            "attributes": item(attributes.as_ref()),
        }),
        WriteOutcome::ConditionNotMet { message } => json!({
            "applied": false,
            "message": message,
        }),
    }
}

/// A table description.
pub fn table(description: &TableDescription) -> serde_json::Value {
    json!({
        "tableName": description.table_name,
        "status": description.status.to_string(),
        "itemCount": description.item_count,
    })
}

/// Loaded count and failed keys.
pub fn load_summary(summary: &LoadSummary) -> serde_json::Value {
    json!({
        "loaded": summary.loaded,
        "failed": summary
            .failed
            .iter()
            .map(|f| json!({"key": item_to_json(&f.key.to_item()), "reason": f.reason}))
            .collect::<Vec<_>>(),
    })
}
