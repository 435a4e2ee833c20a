//! Extraction of flat values from Notion's typed-property JSON.
//!
//! Each property value carries a `type` tag ("title", "rich_text",
//! "select", "status") and its payload under a key of the same name.
//! Database schemas vary in both property naming ("Status" vs "status")
//! and typing (status vs select), so the composite lookups here try every
//! shape we have seen in the wild rather than assuming one canonical
//! schema.

use serde_json::{Map, Value};

fn plain_text_concat(items: &[Value]) -> String {
    items
        .iter()
        .filter_map(|item| item.get("plain_text").and_then(Value::as_str))
        .collect()
}

/// Concatenated plain text of the property tagged "title", or "Untitled"
/// when no title property exists or it has no segments.
pub fn extract_title(properties: &Map<String, Value>) -> String {
    for value in properties.values() {
        if value.get("type").and_then(Value::as_str) != Some("title") {
            continue;
        }
        if let Some(items) = value.get("title").and_then(Value::as_array) {
            if !items.is_empty() {
                return plain_text_concat(items);
            }
        }
    }
    "Untitled".to_string()
}

/// Concatenated plain text of the named rich_text property, if present.
pub fn extract_rich_text(properties: &Map<String, Value>, name: &str) -> Option<String> {
    let prop = properties.get(name)?;
    if prop.get("type").and_then(Value::as_str) != Some("rich_text") {
        return None;
    }
    let items = prop.get("rich_text").and_then(Value::as_array)?;
    if items.is_empty() {
        return None;
    }
    Some(plain_text_concat(items))
}

fn extract_option(properties: &Map<String, Value>, name: &str, kind: &str) -> Option<String> {
    let prop = properties.get(name)?;
    if prop.get("type").and_then(Value::as_str) != Some(kind) {
        return None;
    }
    prop.get(kind)?
        .get("name")
        .and_then(Value::as_str)
        .map(String::from)
}

/// The selected option name of the named select property, if present.
pub fn extract_select(properties: &Map<String, Value>, name: &str) -> Option<String> {
    extract_option(properties, name, "select")
}

/// The current option name of the named status property, if present.
pub fn extract_status(properties: &Map<String, Value>, name: &str) -> Option<String> {
    extract_option(properties, name, "status")
}

/// Description lookup across the casings databases use.
pub fn description(properties: &Map<String, Value>) -> Option<String> {
    extract_rich_text(properties, "Description").or_else(|| extract_rich_text(properties, "description"))
}

/// Status lookup across casings and the status-vs-select typing split.
pub fn status(properties: &Map<String, Value>) -> Option<String> {
    extract_status(properties, "Status")
        .or_else(|| extract_status(properties, "status"))
        .or_else(|| extract_select(properties, "Status"))
        .or_else(|| extract_select(properties, "status"))
}

/// Priority lookup across casings.
pub fn priority(properties: &Map<String, Value>) -> Option<String> {
    extract_select(properties, "Priority").or_else(|| extract_select(properties, "priority"))
}
