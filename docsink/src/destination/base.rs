use std::collections::BTreeSet;
use std::future::Future;

use crate::error::SinkResult;
use crate::types::{Document, WriteIntent};

/// Read access to stored documents.
///
/// Used by the change-event builder to fetch the prior version of a
/// document. Implementations must be safe for concurrent reads, since the
/// diff coordinator issues multiple `get` calls at a time through a shared
/// handle.
pub trait StoreReader {
    /// Fetches a stored document by index and id.
    ///
    /// Returns `Ok(None)` when the document does not exist; this is an
    /// expected outcome, not an error. Any other store failure is returned
    /// as an error and fails the batch that requested it.
    fn get(
        &self,
        index: &str,
        id: &str,
    ) -> impl Future<Output = SinkResult<Option<Document>>> + Send;
}

/// Write access to the document store.
///
/// [`StoreWriter`] implementations translate [`WriteIntent`]s into the
/// store's native write protocol. Upserts must be applied as a single
/// conditional operation with two branches: on create, write all new fields
/// including the excluded ones; on update, merge all new fields except
/// those named in the intent's `merge_exclude`. Per-item write failures are
/// logged by the writer, not raised.
pub trait StoreWriter {
    /// Provisions the given indices before any write executes.
    ///
    /// Called with the distinct index set of a batch. Creating an index
    /// that already exists must be a no-op.
    fn ensure_indices(
        &self,
        indices: &BTreeSet<String>,
    ) -> impl Future<Output = SinkResult<()>> + Send;

    /// Applies a sequence of write intents.
    fn apply_write_intents(
        &self,
        intents: Vec<WriteIntent>,
    ) -> impl Future<Output = SinkResult<()>> + Send;
}
