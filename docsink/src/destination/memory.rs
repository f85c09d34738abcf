use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::destination::base::{StoreReader, StoreWriter};
use crate::error::SinkResult;
use crate::types::{Document, WriteIntent, id_string};

#[derive(Debug, Default)]
struct Inner {
    /// Documents by index, then by id.
    documents: HashMap<String, BTreeMap<String, Document>>,
    /// Counter for inserts that carry no `_id` metadata.
    next_autogenerated_id: u64,
}

/// In-memory document store for testing and development purposes.
///
/// [`MemoryStore`] holds all documents in memory and implements the same
/// two-branch upsert contract a real store writer must provide: on create,
/// all new fields are written including the excluded ones; on update, all
/// new fields are merged except those in the intent's `merge_exclude`.
/// Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Creates a new empty [`MemoryStore`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a document directly, bypassing the write-intent path.
    ///
    /// Useful for seeding prior document versions in tests.
    pub async fn seed(&self, index: &str, id: &str, document: Document) {
        let mut inner = self.inner.lock().await;
        inner
            .documents
            .entry(index.to_string())
            .or_default()
            .insert(id.to_string(), document);
    }

    /// Returns a stored document, if present.
    pub async fn document(&self, index: &str, id: &str) -> Option<Document> {
        let inner = self.inner.lock().await;
        inner
            .documents
            .get(index)
            .and_then(|documents| documents.get(id))
            .cloned()
    }

    /// Returns all documents stored in an index, ordered by id.
    pub async fn documents_in(&self, index: &str) -> Vec<Document> {
        let inner = self.inner.lock().await;
        inner
            .documents
            .get(index)
            .map(|documents| documents.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns the names of all provisioned indices.
    pub async fn indices(&self) -> BTreeSet<String> {
        let inner = self.inner.lock().await;
        inner.documents.keys().cloned().collect()
    }
}

impl StoreReader for MemoryStore {
    fn get(
        &self,
        index: &str,
        id: &str,
    ) -> impl Future<Output = SinkResult<Option<Document>>> + Send {
        async move { Ok(self.document(index, id).await) }
    }
}

impl StoreWriter for MemoryStore {
    fn ensure_indices(
        &self,
        indices: &BTreeSet<String>,
    ) -> impl Future<Output = SinkResult<()>> + Send {
        async move {
            let mut inner = self.inner.lock().await;
            for index in indices {
                inner.documents.entry(index.clone()).or_default();
            }
            Ok(())
        }
    }

    fn apply_write_intents(
        &self,
        intents: Vec<WriteIntent>,
    ) -> impl Future<Output = SinkResult<()>> + Send {
        async move {
            let mut inner = self.inner.lock().await;
            for intent in intents {
                match intent {
                    WriteIntent::Insert {
                        index,
                        document,
                        extra_fields,
                    } => {
                        let id = match extra_fields.get("_id") {
                            Some(value) => id_string(value),
                            None => {
                                inner.next_autogenerated_id += 1;
                                format!("auto-{}", inner.next_autogenerated_id)
                            }
                        };
                        inner
                            .documents
                            .entry(index)
                            .or_default()
                            .insert(id, document);
                    }
                    WriteIntent::Upsert {
                        index,
                        id,
                        new_fields,
                        merge_exclude,
                    } => {
                        let documents = inner.documents.entry(index).or_default();
                        match documents.get_mut(&id) {
                            // On update, merge everything except the excluded fields.
                            Some(stored) => {
                                for (key, value) in new_fields {
                                    if !merge_exclude.contains(&key) {
                                        stored.insert(key, value);
                                    }
                                }
                            }
                            // On create, write all fields verbatim.
                            None => {
                                documents.insert(id, new_fields);
                            }
                        }
                    }
                }
            }

            debug!("applied write intents to memory store");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_upsert_creates_with_all_fields() {
        let store = MemoryStore::new();

        store
            .apply_write_intents(vec![WriteIntent::Upsert {
                index: "animals".to_string(),
                id: "rex".to_string(),
                new_fields: doc(json!({"name": "Rex", "_sdc_sequence": 1})),
                merge_exclude: vec!["_sdc_sequence".to_string()],
            }])
            .await
            .unwrap();

        assert_eq!(
            store.document("animals", "rex").await,
            Some(doc(json!({"name": "Rex", "_sdc_sequence": 1})))
        );
    }

    #[tokio::test]
    async fn test_upsert_update_preserves_excluded_field() {
        let store = MemoryStore::new();
        store
            .seed(
                "animals",
                "rex",
                doc(json!({"name": "Rex", "age": 3, "_sdc_sequence": 1})),
            )
            .await;

        store
            .apply_write_intents(vec![WriteIntent::Upsert {
                index: "animals".to_string(),
                id: "rex".to_string(),
                new_fields: doc(json!({"name": "Rex", "age": 4, "_sdc_sequence": 2})),
                merge_exclude: vec!["_sdc_sequence".to_string()],
            }])
            .await
            .unwrap();

        assert_eq!(
            store.document("animals", "rex").await,
            Some(doc(json!({"name": "Rex", "age": 4, "_sdc_sequence": 1})))
        );
    }

    #[tokio::test]
    async fn test_insert_uses_id_metadata_when_present() {
        let store = MemoryStore::new();

        store
            .apply_write_intents(vec![WriteIntent::Insert {
                index: "events".to_string(),
                document: doc(json!({"kind": "created"})),
                extra_fields: doc(json!({"_id": "rex-event-1"})),
            }])
            .await
            .unwrap();

        assert!(store.document("events", "rex-event-1").await.is_some());
    }

    #[tokio::test]
    async fn test_get_missing_document_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("animals", "rex").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ensure_indices_is_idempotent() {
        let store = MemoryStore::new();
        let indices = BTreeSet::from(["animals".to_string()]);

        store.ensure_indices(&indices).await.unwrap();
        store
            .seed("animals", "rex", doc(json!({"name": "Rex"})))
            .await;
        store.ensure_indices(&indices).await.unwrap();

        assert!(store.document("animals", "rex").await.is_some());
    }
}
