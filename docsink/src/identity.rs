//! Document identity resolution.
//!
//! Determines the stable id under which a record is stored, so repeated
//! deliveries of the same logical entity update one document instead of
//! accumulating duplicates. Resolution is pure and deterministic given the
//! record and the stream's configured composite key.

use serde_json::Value;

use crate::types::{Document, id_string};

/// Id-shaped fields scanned, in order, when no composite key applies.
const ID_FIELD_PRIORITY: &[&str] = &["_id", "id", "uuid", "guid", "key"];

/// Resolves the stable document id for a record.
///
/// Precedence:
/// 1. The configured composite key, when every listed field is present in
///    the record: the field values joined with `-` in configured order.
/// 2. The first present field from a fixed priority list of id-shaped names.
/// 3. The empty string, meaning no identity could be resolved.
///
/// A fully satisfied composite key always wins, even when an id-shaped
/// field is also present. Null-valued fields count as absent.
pub fn resolve_document_id(record: &Document, composite_keys: Option<&[String]>) -> String {
    if let Some(keys) = composite_keys
        && !keys.is_empty()
        && keys.iter().all(|key| has_value(record, key))
    {
        return keys
            .iter()
            .map(|key| id_string(&record[key.as_str()]))
            .collect::<Vec<_>>()
            .join("-");
    }

    for key in ID_FIELD_PRIORITY {
        if has_value(record, key) {
            return id_string(&record[*key]);
        }
    }

    String::new()
}

fn has_value(record: &Document, key: &str) -> bool {
    !matches!(record.get(key), None | Some(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_composite_key_wins_over_id_field() {
        let record = doc(json!({"id": "generic", "region": "eu", "sku": 42}));
        let composite = keys(&["region", "sku"]);

        assert_eq!(
            resolve_document_id(&record, Some(&composite)),
            "eu-42"
        );
    }

    #[test]
    fn test_partial_composite_key_falls_through() {
        let record = doc(json!({"id": "generic", "region": "eu"}));
        let composite = keys(&["region", "sku"]);

        assert_eq!(resolve_document_id(&record, Some(&composite)), "generic");
    }

    #[test]
    fn test_priority_order_of_id_fields() {
        let record = doc(json!({"id": "second", "_id": "first"}));
        assert_eq!(resolve_document_id(&record, None), "first");

        let record = doc(json!({"uuid": "u", "guid": "g"}));
        assert_eq!(resolve_document_id(&record, None), "u");
    }

    #[test]
    fn test_numeric_id_is_coerced_to_string() {
        let record = doc(json!({"id": 17}));
        assert_eq!(resolve_document_id(&record, None), "17");
    }

    #[test]
    fn test_null_id_counts_as_absent() {
        let record = doc(json!({"id": null, "key": "k1"}));
        assert_eq!(resolve_document_id(&record, None), "k1");
    }

    #[test]
    fn test_no_identity_yields_empty_string() {
        let record = doc(json!({"name": "Rex"}));
        assert_eq!(resolve_document_id(&record, None), "");
    }
}
