use serde_json::{Map, Value};

/// A JSON object, used both for incoming records and stored documents.
///
/// Records are arbitrarily nested; values are the full JSON union of
/// string, number, boolean, null, nested object and array. The engine
/// pattern-matches on [`Value`] tags explicitly instead of assuming shapes.
pub type Document = Map<String, Value>;

/// Returns the string form of a value when used as (part of) a document id.
///
/// Strings are used as-is, everything else uses its JSON rendering.
pub fn id_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Whether a value is null or the empty string.
///
/// Such values are dropped from change events before emission.
pub fn is_null_or_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
