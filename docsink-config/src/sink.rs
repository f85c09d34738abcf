use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{DiffConfig, ValidationError};

/// Per-stream field mapping tables.
///
/// Outer key is the stream name, inner map goes from output key to the path
/// expression that selects the value inside a record.
pub type FieldMappings = HashMap<String, HashMap<String, String>>;

/// Configuration for a document-store sink.
///
/// Contains the index name template plus the per-stream tables that drive
/// field extraction, identity resolution and change-event generation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SinkConfig {
    /// Template used to render the destination index name for each record.
    ///
    /// Rendered with the stream name, the precomputed
    /// `current_timestamp_daily|monthly|yearly` variables, the
    /// `to_daily`/`to_monthly`/`to_yearly` helper functions, and the values
    /// extracted through [`SinkConfig::index_schema_fields`].
    pub index_format: String,
    /// Per-stream mappings whose extracted values are available to the index
    /// name template.
    #[serde(default)]
    pub index_schema_fields: FieldMappings,
    /// Per-stream mappings extracted into store-level metadata for each
    /// write, e.g. an `_id` mapping for records with a natural primary key.
    #[serde(default)]
    pub metadata_fields: FieldMappings,
    /// Per-stream ordered lists of field names joined into a composite
    /// document id. A composite key only applies when every listed field is
    /// present in the record.
    #[serde(default)]
    pub composite_keys: HashMap<String, Vec<String>>,
    /// Change-event generation settings.
    #[serde(default)]
    pub diff: DiffConfig,
}

impl SinkConfig {
    /// Validates the sink configuration.
    ///
    /// Checks the index template is non-empty, composite key lists are
    /// non-empty, and all diff settings are well formed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.index_format.trim().is_empty() {
            return Err(ValidationError::EmptyIndexFormat);
        }

        for (stream, keys) in &self.composite_keys {
            if keys.is_empty() {
                return Err(ValidationError::EmptyCompositeKeys {
                    stream: stream.clone(),
                });
            }
        }

        self.diff.validate()
    }

    /// Returns the index field mapping configured for a stream, if any.
    pub fn index_fields_for(&self, stream_name: &str) -> Option<&HashMap<String, String>> {
        self.index_schema_fields.get(stream_name)
    }

    /// Returns the metadata field mapping configured for a stream, if any.
    pub fn metadata_fields_for(&self, stream_name: &str) -> Option<&HashMap<String, String>> {
        self.metadata_fields.get(stream_name)
    }

    /// Returns the composite identity key configured for a stream, if any.
    pub fn composite_keys_for(&self, stream_name: &str) -> Option<&[String]> {
        self.composite_keys
            .get(stream_name)
            .map(|keys| keys.as_slice())
    }
}
