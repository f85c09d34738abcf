use chrono::{SecondsFormat, Utc};
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::SinkConfig;
use crate::destination::StoreReader;
use crate::diff::engine::diff_documents;
use crate::error::SinkResult;
use crate::identity::resolve_document_id;
use crate::types::{Document, id_string, is_null_or_empty};

/// Bookkeeping fields excluded from diffing by default.
///
/// These change on every delivery and would otherwise make every redelivery
/// look like a document change.
pub const DEFAULT_IGNORED_FIELDS: &[&str] = &[
    "^_sdc_extracted_at$",
    "^_sdc_received_at$",
    "^_sdc_batched_at$",
    "^_sdc_deleted_at$",
    "^_sdc_sequence$",
    "^_sdc_table_version$",
    "^_sdc_sync_started_at$",
];

/// Bookkeeping fields copied from the record onto the change event.
const PROPAGATED_FIELDS: &[&str] = &["_sdc_sequence", "_sdc_extracted_at", "_sdc_batched_at"];

/// Compiles the ignore-pattern set for a stream: the fixed default
/// bookkeeping patterns plus the stream's configured extras.
pub fn compile_ignore_patterns(extra: &[String]) -> SinkResult<Vec<Regex>> {
    let mut patterns = Vec::with_capacity(DEFAULT_IGNORED_FIELDS.len() + extra.len());
    for source in DEFAULT_IGNORED_FIELDS {
        patterns.push(Regex::new(source)?);
    }
    for source in extra {
        patterns.push(Regex::new(source)?);
    }
    Ok(patterns)
}

/// Builds the change event for one record, or `None` when no event applies.
///
/// Resolves the record's identity (no identity means no event), fetches the
/// prior document from the store (absent prior diffs against an empty
/// document), diffs prior against the record with the given ignore patterns,
/// and suppresses the event when nothing changed. Store failures other than
/// "not found" propagate. The returned pair is the event document id for
/// dedup-safe indexing and the event document itself.
///
/// The ignore pattern set is shared across a batch; callers compile it once
/// through [`compile_ignore_patterns`].
pub async fn build_change_event<S>(
    store: &S,
    stream_name: &str,
    record: &Document,
    target_index: &str,
    ignore: &[Regex],
    config: &SinkConfig,
) -> SinkResult<Option<(String, Document)>>
where
    S: StoreReader,
{
    let doc_id = resolve_document_id(record, config.composite_keys_for(stream_name));
    if doc_id.is_empty() {
        debug!(
            stream = stream_name,
            "record has no resolvable identity, skipping change event"
        );
        return Ok(None);
    }

    let stream_config = config.diff.stream(stream_name);
    let event_ts = resolve_event_timestamp(stream_name, record, stream_config);

    let prior = store
        .get(target_index, &doc_id)
        .await?
        .unwrap_or_default();

    let diff = diff_documents(&prior, record, ignore);
    if diff.is_empty() {
        debug!(
            stream = stream_name,
            id = %doc_id,
            "document unchanged, suppressing change event"
        );
        return Ok(None);
    }

    let event_id = format!("{doc_id}-event-{event_ts}");
    let mut event = Document::new();
    event.insert("id".to_string(), Value::String(event_id.clone()));
    event.insert("main_doc_key".to_string(), Value::String(doc_id));
    event.insert("event_ts".to_string(), Value::String(event_ts));
    for field in PROPAGATED_FIELDS {
        if let Some(value) = record.get(*field) {
            event.insert(field.to_string(), value.clone());
        }
    }
    event.insert("from".to_string(), Value::Object(diff.from));
    event.insert("to".to_string(), Value::Object(diff.to));
    event.insert("new_doc".to_string(), Value::Object(record.clone()));

    // Null and empty-string values carry no information in an event.
    event.retain(|_, value| !is_null_or_empty(value));

    Ok(Some((event_id, event)))
}

/// Determines the event timestamp for a record.
///
/// Autogeneration uses the current time. A configured event-time field is
/// extracted from the record; when the field is missing the current time is
/// used as a last resort so the event is still addressable.
fn resolve_event_timestamp(
    stream_name: &str,
    record: &Document,
    stream_config: Option<&crate::config::StreamDiffConfig>,
) -> String {
    let now = || Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

    let Some(stream_config) = stream_config else {
        return now();
    };
    if stream_config.autogenerate_event_time {
        return now();
    }

    match &stream_config.event_time_field {
        Some(field) => match record.get(field) {
            Some(value) if !is_null_or_empty(value) => id_string(value),
            _ => {
                warn!(
                    stream = stream_name,
                    field = %field,
                    "configured event time field missing from record, using current time"
                );
                now()
            }
        },
        None => now(),
    }
}
