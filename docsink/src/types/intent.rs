use crate::types::Document;

/// One unit of a batched write against the document store.
///
/// Each intent targets exactly one index. The store writer is responsible
/// for translating intents into the store's native bulk protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteIntent {
    /// Unconditional insert of a new document.
    Insert {
        /// Destination index name.
        index: String,
        /// The document body.
        document: Document,
        /// Store-level addressing fields extracted through the metadata
        /// mapping, e.g. an `_id` entry for dedup-safe indexing.
        extra_fields: Document,
    },
    /// Conditional upsert addressed by document id.
    ///
    /// The store writer must implement this as a single atomic operation
    /// with two branches: on create, write all of `new_fields`; on update,
    /// merge every field of `new_fields` into the stored document except
    /// the ones named in `merge_exclude`.
    Upsert {
        /// Destination index name.
        index: String,
        /// Stable document id.
        id: String,
        /// Fields of the incoming record, plus metadata extraction.
        new_fields: Document,
        /// Field names that must never be overwritten on update, i.e. the
        /// sequence bookkeeping field set on first creation.
        merge_exclude: Vec<String>,
    },
}

impl WriteIntent {
    /// Returns the target index of this intent.
    pub fn index(&self) -> &str {
        match self {
            WriteIntent::Insert { index, .. } => index,
            WriteIntent::Upsert { index, .. } => index,
        }
    }
}
