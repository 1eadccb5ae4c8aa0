//! Pretty output formatting.

use tablekit_core::storage::{Page, WriteOutcome};
use tablekit_core::table::TableDescription;
use tablekit_core::value::{item_to_json, Item};

use crate::loader::LoadSummary;

/// Format an item as an indented JSON document.
pub fn format_item(item: &Item) -> String {
    serde_json::to_string_pretty(&item_to_json(item)).unwrap_or_default()
}

/// `year : title`, as printed for query results.
pub fn format_title_line(item: &Item) -> String {
    let year = item
        .get("year")
        .and_then(|v| v.as_number())
        .map(ToString::to_string)
        .unwrap_or_else(|| "?".to_string());
    let title = item.get("title").and_then(|v| v.as_str()).unwrap_or("?");
    format!("{year} : {title}")
}

/// `year : title`, followed by the projected `info` attributes when present.
pub fn format_result_line(item: &Item) -> String {
    let line = format_title_line(item);
    match item.get("info") {
        Some(info) => format!(
            "{line}  {}",
            serde_json::to_string(&info.to_json()).unwrap_or_default()
        ),
        None => line,
    }
}

/// Count line for a query or scan.
pub fn format_page_summary(page: &Page) -> String {
    let mut output = format!(
        "{} item(s) returned, {} scanned",
        page.count, page.scanned_count
    );
    if let Some(key) = &page.last_evaluated_key {
        output.push_str(&format!(
            "\n  More results after: {}",
            serde_json::to_string(&item_to_json(key)).unwrap_or_default()
        ));
    }
    output
}

/// Format an item lookup.
pub fn format_lookup(item: Option<&Item>) -> String {
    match item {
        Some(item) => format_item(item),
        None => "No item found.".to_string(),
    }
}

/// Describe a conditional write outcome.
pub fn format_outcome(operation: &str, outcome: &WriteOutcome<Option<Item>>) -> String {
    match outcome {
        WriteOutcome::Applied(Some(attributes)) => {
            format!("{operation} succeeded:\n{}", format_item(attributes))
        }
        WriteOutcome::Applied(None) => format!("{operation} succeeded."),
        WriteOutcome::ConditionNotMet { message } => {
            format!("{operation} skipped: {message}")
        }
    }
}

/// Format a table description.
pub fn format_table(description: &TableDescription) -> String {
    let mut output = format!("{} ({})", description.table_name, description.status);
    if let Some(count) = description.item_count {
        output.push_str(&format!("\n  Items: {count}"));
    }
    output
}

/// Loaded count, then one line per failed record.
pub fn format_load_summary(summary: &LoadSummary) -> String {
    let mut output = format!("{} movie(s) loaded", summary.loaded);
    if !summary.failed.is_empty() {
        output.push_str(&format!(", {} failed", summary.failed.len()));
        for failure in &summary.failed {
            output.push_str(&format!("\n  ! {}: {}", failure.key, failure.reason));
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablekit_core::key::PrimaryKey;
    use tablekit_core::value::Value;

    fn movie(year: i64, title: &str) -> Item {
        PrimaryKey::partition("year", year)
            .with_sort("title", title)
            .to_item()
    }

    #[test]
    fn test_title_line() {
        assert_eq!(format_title_line(&movie(2013, "Rush")), "2013 : Rush");
        assert_eq!(format_title_line(&Item::new()), "? : ?");
    }

    #[test]
    fn test_result_line_shows_info() {
        let mut item = movie(1980, "Airplane!");
        assert_eq!(format_result_line(&item), "1980 : Airplane!");

        let mut info = Item::new();
        info.insert("rating".to_string(), Value::number("7.8").unwrap());
        item.insert("info".to_string(), Value::M(info));
        assert_eq!(format_result_line(&item), r#"1980 : Airplane!  {"rating":7.8}"#);
    }

    #[test]
    fn test_page_summary() {
        let mut page = Page {
            items: vec![movie(1980, "A")],
            count: 1,
            scanned_count: 5,
            last_evaluated_key: None,
        };
        assert_eq!(format_page_summary(&page), "1 item(s) returned, 5 scanned");

        page.last_evaluated_key = Some(movie(1980, "A"));
        assert!(format_page_summary(&page)
            .ends_with(r#"More results after: {"title":"A","year":1980}"#));
    }

    #[test]
    fn test_load_summary() {
        let mut summary = LoadSummary {
            loaded: 3,
            failed: Vec::new(),
        };
        assert_eq!(format_load_summary(&summary), "3 movie(s) loaded");

        summary.failed.push(crate::loader::LoadFailure {
            key: PrimaryKey::partition("year", 1985).with_sort("title", ""),
            reason: "rejected".to_string(),
        });
        let text = format_load_summary(&summary);
        assert!(text.starts_with("3 movie(s) loaded, 1 failed\n  ! "));
        assert!(text.ends_with(": rejected"));
    }

    #[test]
    fn test_lookup() {
        assert_eq!(format_lookup(None), "No item found.");
        assert!(format_lookup(Some(&movie(2015, "X"))).contains("\"year\": 2015"));
    }

    #[test]
    fn test_outcome() {
        assert_eq!(
            format_outcome("DeleteItem", &WriteOutcome::Applied(None)),
            "DeleteItem succeeded."
        );
        assert_eq!(
            format_outcome("DeleteItem", &WriteOutcome::condition_not_met()),
            "DeleteItem skipped: The conditional request failed"
        );
    }
}
