use futures::{StreamExt, TryStreamExt, stream};
use serde_json::Value;
use tracing::debug;

use crate::config::SinkConfig;
use crate::destination::StoreReader;
use crate::diff::event::{build_change_event, compile_ignore_patterns};
use crate::error::SinkResult;
use crate::types::{Document, WriteIntent};

/// Computes change events for a batch of records with bounded concurrency.
///
/// Each record is one independent unit of work; the pool width bounds the
/// number of concurrent prior-document reads against the store. Results are
/// collected regardless of completion order. The first fatal error stops
/// submission of further units and propagates to the caller; results of
/// already-completed siblings are discarded for the batch.
///
/// Each emitted event becomes an insert intent against the event index
/// derived from `target_index` by the configured suffix.
pub async fn run_change_events<S>(
    store: &S,
    stream_name: &str,
    records: &[Document],
    target_index: &str,
    config: &SinkConfig,
) -> SinkResult<Vec<WriteIntent>>
where
    S: StoreReader + Sync,
{
    let event_index = format!("{target_index}{}", config.diff.event_index_suffix);
    // A zero-width pool would stall the stream; config validation rejects it,
    // but direct callers are not forced through validation.
    let concurrency = usize::from(config.diff.max_diff_workers).max(1);

    // One compiled pattern set serves the whole batch.
    let extra_patterns = config
        .diff
        .stream(stream_name)
        .map(|c| c.ignored_fields.as_slice())
        .unwrap_or(&[]);
    let ignore = compile_ignore_patterns(extra_patterns)?;

    let events: Vec<Option<(String, Document)>> = stream::iter(records)
        .map(|record| build_change_event(store, stream_name, record, target_index, &ignore, config))
        .buffer_unordered(concurrency)
        .try_collect()
        .await?;

    let mut intents = Vec::new();
    for (event_id, event) in events.into_iter().flatten() {
        let mut extra_fields = Document::new();
        extra_fields.insert("_id".to_string(), Value::String(event_id));
        intents.push(WriteIntent::Insert {
            index: event_index.clone(),
            document: event,
            extra_fields,
        });
    }

    debug!(
        stream = stream_name,
        index = target_index,
        events = intents.len(),
        records = records.len(),
        "change event batch complete"
    );

    Ok(intents)
}
