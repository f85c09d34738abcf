//! Field extraction for index templating and write metadata.
//!
//! Applies the per-stream `(output key -> path expression)` mappings against
//! one record. Extraction anomalies are diagnostics only and never fail the
//! record: a path that does not resolve falls back to the literal expression
//! string so downstream templating always has a non-empty placeholder, and
//! an ambiguous path uses the first match.

use serde_json::Value;
use tracing::warn;

use crate::config::FieldMappings;
use crate::error::SinkResult;
use crate::extract::PathExpr;
use crate::types::Document;

/// Extracts the mapped fields of one record for a stream.
///
/// Returns an empty map when no mapping is configured for the stream.
pub fn build_fields(stream_name: &str, mappings: &FieldMappings, record: &Document) -> Document {
    let mut fields = Document::new();
    let Some(mapping) = mappings.get(stream_name) else {
        return fields;
    };

    for (key, expr) in mapping {
        let parsed = match PathExpr::parse(expr) {
            Ok(parsed) => parsed,
            Err(error) => {
                // Malformed expressions are caught by startup validation;
                // if one still reaches us, degrade like a missing path.
                warn!(
                    stream = stream_name,
                    key = %key,
                    expr = %expr,
                    %error,
                    "mapping path expression is malformed, using the literal expression"
                );
                fields.insert(key.clone(), Value::String(expr.clone()));
                continue;
            }
        };

        let matches = parsed.evaluate(record);
        match matches.as_slice() {
            [] => {
                warn!(
                    stream = stream_name,
                    key = %key,
                    expr = %expr,
                    "mapping path not found in record, using the literal expression"
                );
                fields.insert(key.clone(), Value::String(expr.clone()));
            }
            [single] => {
                fields.insert(key.clone(), (*single).clone());
            }
            [first, ..] => {
                warn!(
                    stream = stream_name,
                    key = %key,
                    expr = %expr,
                    matches = matches.len(),
                    "mapping path has multiple matches, using the first"
                );
                fields.insert(key.clone(), (*first).clone());
            }
        }
    }

    fields
}

/// Parses every path expression in the per-stream mapping tables.
///
/// Called once at sink construction so malformed expressions fail fast
/// instead of degrading every record.
pub fn validate_mappings(mappings: &FieldMappings) -> SinkResult<()> {
    for mapping in mappings.values() {
        for expr in mapping.values() {
            PathExpr::parse(expr)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn record() -> Document {
        json!({
            "id": 1,
            "created_at": "some tz",
            "some_nesting": { "test": "bar" },
            "some_array": ["biz", "buz"]
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    fn mappings(stream: &str, pairs: &[(&str, &str)]) -> FieldMappings {
        let mapping: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        FieldMappings::from([(stream.to_string(), mapping)])
    }

    #[test]
    fn test_unknown_stream_yields_empty_map() {
        let fields = build_fields("people", &mappings("animals", &[]), &record());
        assert!(fields.is_empty());
    }

    #[test]
    fn test_top_level_extraction() {
        let fields = build_fields(
            "animals",
            &mappings("animals", &[("timestamp", "created_at")]),
            &record(),
        );
        assert_eq!(fields, json!({"timestamp": "some tz"}).as_object().cloned().unwrap());
    }

    #[test]
    fn test_nested_extraction_returns_leaf() {
        let fields = build_fields(
            "animals",
            &mappings("animals", &[("hup", "some_nesting.test")]),
            &record(),
        );
        assert_eq!(fields, json!({"hup": "bar"}).as_object().cloned().unwrap());
    }

    #[test]
    fn test_array_extraction_returns_indexed_element() {
        let fields = build_fields(
            "animals",
            &mappings("animals", &[("hup", "some_array[0]")]),
            &record(),
        );
        assert_eq!(fields, json!({"hup": "biz"}).as_object().cloned().unwrap());
    }

    #[test]
    fn test_missing_path_falls_back_to_literal_expression() {
        let fields = build_fields(
            "animals",
            &mappings("animals", &[("hup", "nope.nothing")]),
            &record(),
        );
        assert_eq!(
            fields,
            json!({"hup": "nope.nothing"}).as_object().cloned().unwrap()
        );
    }

    #[test]
    fn test_ambiguous_path_uses_first_match() {
        let fields = build_fields(
            "animals",
            &mappings("animals", &[("hup", "some_array[*]")]),
            &record(),
        );
        assert_eq!(fields, json!({"hup": "biz"}).as_object().cloned().unwrap());
    }

    #[test]
    fn test_validate_mappings_rejects_malformed_expression() {
        assert!(validate_mappings(&mappings("animals", &[("hup", "a..b")])).is_err());
        assert!(validate_mappings(&mappings("animals", &[("hup", "a.b")])).is_ok());
    }
}
