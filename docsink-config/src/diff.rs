use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Change-event generation configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DiffConfig {
    /// Streams for which change events are generated.
    ///
    /// Entries ending in `*` match stream names by prefix, all other entries
    /// match exactly.
    #[serde(default)]
    pub enabled_streams: Vec<String>,
    /// Per-stream change-event settings, keyed by stream name.
    #[serde(default)]
    pub streams: HashMap<String, StreamDiffConfig>,
    /// Suffix appended to a main index name to form its event index name.
    #[serde(default = "default_event_index_suffix")]
    pub event_index_suffix: String,
    /// Width of the worker pool computing change events for a batch.
    ///
    /// Bounds the number of concurrent prior-document reads against the
    /// store.
    #[serde(default = "default_max_diff_workers")]
    pub max_diff_workers: u16,
}

impl DiffConfig {
    /// Default event index suffix.
    pub const DEFAULT_EVENT_INDEX_SUFFIX: &'static str = "-events";

    /// Default diff worker pool width.
    pub const DEFAULT_MAX_DIFF_WORKERS: u16 = 10;

    /// Validates diff configuration settings.
    ///
    /// Ensures the worker pool width is non-zero and all ignored-field
    /// patterns compile as regular expressions.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_diff_workers == 0 {
            return Err(ValidationError::MaxDiffWorkersZero);
        }

        for (stream, stream_config) in &self.streams {
            for pattern in &stream_config.ignored_fields {
                if let Err(source) = regex::Regex::new(pattern) {
                    return Err(ValidationError::InvalidIgnorePattern {
                        stream: stream.clone(),
                        pattern: pattern.clone(),
                        source,
                    });
                }
            }
        }

        Ok(())
    }

    /// Whether change-event generation is enabled for the given stream.
    pub fn is_enabled_for(&self, stream_name: &str) -> bool {
        self.enabled_streams
            .iter()
            .any(|entry| match entry.strip_suffix('*') {
                Some(prefix) => stream_name.starts_with(prefix),
                None => entry == stream_name,
            })
    }

    /// Returns the per-stream settings for the given stream, if configured.
    pub fn stream(&self, stream_name: &str) -> Option<&StreamDiffConfig> {
        self.streams.get(stream_name)
    }
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            enabled_streams: Vec::new(),
            streams: HashMap::new(),
            event_index_suffix: default_event_index_suffix(),
            max_diff_workers: default_max_diff_workers(),
        }
    }
}

fn default_event_index_suffix() -> String {
    DiffConfig::DEFAULT_EVENT_INDEX_SUFFIX.to_string()
}

fn default_max_diff_workers() -> u16 {
    DiffConfig::DEFAULT_MAX_DIFF_WORKERS
}

/// Per-stream change-event settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StreamDiffConfig {
    /// Record field holding the event timestamp.
    ///
    /// Ignored when [`StreamDiffConfig::autogenerate_event_time`] is set.
    #[serde(default)]
    pub event_time_field: Option<String>,
    /// Use the current time as the event timestamp instead of extracting it
    /// from the record.
    #[serde(default)]
    pub autogenerate_event_time: bool,
    /// Extra ignored-field patterns for this stream, merged with the fixed
    /// default set of bookkeeping fields.
    #[serde(default)]
    pub ignored_fields: Vec<String>,
}
