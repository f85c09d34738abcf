//! Bulk write-intent construction.
//!
//! Combines index templating, field extraction and identity resolution into
//! one [`WriteIntent`] per record, and collects the distinct set of target
//! indices so the store writer can provision them before any write executes.

use std::collections::BTreeSet;

use tracing::debug;

use crate::config::SinkConfig;
use crate::error::SinkResult;
use crate::fields::build_fields;
use crate::identity::resolve_document_id;
use crate::template::template_index;
use crate::types::{Document, WriteIntent};

/// The sequence bookkeeping field written on document creation and never
/// overwritten on update.
pub const SEQUENCE_FIELD: &str = "_sdc_sequence";

/// Builds one write intent per record and the distinct target index set.
///
/// Records with a resolvable identity become conditional upserts that
/// preserve [`SEQUENCE_FIELD`] on update; records without one become plain
/// inserts. Index templating errors abort the batch.
pub fn build_write_intents(
    config: &SinkConfig,
    stream_name: &str,
    records: &[Document],
) -> SinkResult<(Vec<WriteIntent>, BTreeSet<String>)> {
    let mut intents = Vec::with_capacity(records.len());
    let mut indices = BTreeSet::new();

    for record in records {
        let index_fields = build_fields(stream_name, &config.index_schema_fields, record);
        let index = template_index(stream_name, &config.index_format, &index_fields)?;
        indices.insert(index.clone());

        let metadata = build_fields(stream_name, &config.metadata_fields, record);
        let id = resolve_document_id(record, config.composite_keys_for(stream_name));

        if id.is_empty() {
            debug!(stream = stream_name, index = %index, "record has no identity, inserting");
            intents.push(WriteIntent::Insert {
                index,
                document: record.clone(),
                extra_fields: metadata,
            });
        } else {
            debug!(stream = stream_name, index = %index, id = %id, "record has identity, upserting");
            let mut new_fields = record.clone();
            new_fields.extend(metadata);
            intents.push(WriteIntent::Upsert {
                index,
                id,
                new_fields,
                merge_exclude: vec![SEQUENCE_FIELD.to_string()],
            });
        }
    }

    Ok((intents, indices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn config(index_format: &str) -> SinkConfig {
        SinkConfig {
            index_format: index_format.to_string(),
            index_schema_fields: HashMap::new(),
            metadata_fields: HashMap::new(),
            composite_keys: HashMap::new(),
            diff: Default::default(),
        }
    }

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_record_with_identity_becomes_upsert() {
        let records = vec![doc(json!({"id": "rex", "age": 4}))];
        let (intents, indices) =
            build_write_intents(&config("{{ stream_name }}-latest"), "animals", &records).unwrap();

        assert_eq!(indices, BTreeSet::from(["animals-latest".to_string()]));
        match &intents[0] {
            WriteIntent::Upsert {
                index,
                id,
                new_fields,
                merge_exclude,
            } => {
                assert_eq!(index, "animals-latest");
                assert_eq!(id, "rex");
                assert_eq!(new_fields, &records[0]);
                assert_eq!(merge_exclude, &vec![SEQUENCE_FIELD.to_string()]);
            }
            other => panic!("expected upsert, got {other:?}"),
        }
    }

    #[test]
    fn test_record_without_identity_becomes_insert() {
        let records = vec![doc(json!({"name": "Rex"}))];
        let (intents, _) =
            build_write_intents(&config("{{ stream_name }}-latest"), "animals", &records).unwrap();

        assert!(matches!(&intents[0], WriteIntent::Insert { .. }));
    }

    #[test]
    fn test_metadata_mapping_goes_to_extra_fields_on_insert() {
        let mut config = config("{{ stream_name }}-latest");
        config.metadata_fields.insert(
            "animals".to_string(),
            HashMap::from([("_id".to_string(), "name".to_string())]),
        );
        let records = vec![doc(json!({"name": "Rex"}))];

        let (intents, _) = build_write_intents(&config, "animals", &records).unwrap();

        match &intents[0] {
            WriteIntent::Insert { extra_fields, .. } => {
                assert_eq!(extra_fields.get("_id"), Some(&json!("Rex")));
            }
            other => panic!("expected insert, got {other:?}"),
        }
    }

    #[test]
    fn test_index_fields_drive_per_record_indices() {
        let mut config = config("{{ stream_name }}-{{ to_yearly(date=ts) }}");
        config.index_schema_fields.insert(
            "animals".to_string(),
            HashMap::from([("ts".to_string(), "created_at".to_string())]),
        );
        let records = vec![
            doc(json!({"id": 1, "created_at": "2017-11-28T23:55:59Z"})),
            doc(json!({"id": 2, "created_at": "2019-01-02T00:00:00Z"})),
        ];

        let (intents, indices) = build_write_intents(&config, "animals", &records).unwrap();

        assert_eq!(intents[0].index(), "animals-2017");
        assert_eq!(intents[1].index(), "animals-2019");
        assert_eq!(
            indices,
            BTreeSet::from(["animals-2017".to_string(), "animals-2019".to_string()])
        );
    }

    #[test]
    fn test_template_failure_aborts_the_batch() {
        let records = vec![doc(json!({"id": 1}))];
        let result = build_write_intents(&config("{{ missing }}"), "animals", &records);
        assert!(result.is_err());
    }
}
