//! Per-stream batch processing entry point.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::config::SinkConfig;
use crate::destination::{StoreReader, StoreWriter};
use crate::diff::run_change_events;
use crate::error::SinkResult;
use crate::fields::validate_mappings;
use crate::ops::build_write_intents;
use crate::types::{Document, WriteIntent};

/// The record transformation engine bound to a document store.
///
/// One [`Sink`] serves all streams; per-stream behavior comes entirely from
/// the configuration. The sink holds no state between batches.
#[derive(Debug, Clone)]
pub struct Sink<S> {
    config: SinkConfig,
    store: S,
}

impl<S> Sink<S>
where
    S: StoreReader + StoreWriter + Sync,
{
    /// Creates a new sink after validating the configuration.
    ///
    /// Fails fast on an empty index template, malformed path expressions or
    /// invalid ignored-field patterns, so no batch ever runs against a bad
    /// configuration.
    pub fn new(config: SinkConfig, store: S) -> SinkResult<Self> {
        config.validate()?;
        validate_mappings(&config.index_schema_fields)?;
        validate_mappings(&config.metadata_fields)?;

        Ok(Self { config, store })
    }

    /// Returns the sink configuration.
    pub fn config(&self) -> &SinkConfig {
        &self.config
    }

    /// Returns the underlying store handle.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Processes one batch of records for a stream.
    ///
    /// Builds one write intent per record, and, when change events are
    /// enabled for the stream, computes change events against the prior
    /// document versions before any new version is written. Intents are
    /// applied after index provisioning; a fatal change-event error fails
    /// the batch before anything is written.
    pub async fn process_batch(
        &self,
        stream_name: &str,
        records: &[Document],
    ) -> SinkResult<()> {
        let (intents, mut indices) = build_write_intents(&self.config, stream_name, records)?;

        // Change events diff against the stored prior versions, so they must
        // be computed before the main intents are applied.
        let event_intents = if self.config.diff.is_enabled_for(stream_name) {
            self.build_event_intents(stream_name, records, &intents)
                .await?
        } else {
            Vec::new()
        };
        for intent in &event_intents {
            indices.insert(intent.index().to_string());
        }

        self.store.ensure_indices(&indices).await?;
        self.store.apply_write_intents(intents).await?;
        let event_count = event_intents.len();
        if event_count > 0 {
            self.store.apply_write_intents(event_intents).await?;
        }

        info!(
            stream = stream_name,
            records = records.len(),
            events = event_count,
            "processed batch"
        );

        Ok(())
    }

    /// Runs the diff coordinator once per distinct target index of the batch.
    ///
    /// Records are grouped by the index their main write intent targets, so
    /// each coordinator run diffs against a single index.
    async fn build_event_intents(
        &self,
        stream_name: &str,
        records: &[Document],
        intents: &[WriteIntent],
    ) -> SinkResult<Vec<WriteIntent>> {
        let target_indices: BTreeSet<&str> =
            intents.iter().map(|intent| intent.index()).collect();

        let mut event_intents = Vec::new();
        for target_index in target_indices {
            let group: Vec<Document> = records
                .iter()
                .zip(intents)
                .filter(|(_, intent)| intent.index() == target_index)
                .map(|(record, _)| record.clone())
                .collect();

            debug!(
                stream = stream_name,
                index = target_index,
                records = group.len(),
                "computing change events"
            );

            let mut intents_for_index = run_change_events(
                &self.store,
                stream_name,
                &group,
                target_index,
                &self.config,
            )
            .await?;
            event_intents.append(&mut intents_for_index);
        }

        Ok(event_intents)
    }
}
