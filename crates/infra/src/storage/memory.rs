//! In-memory document metadata store
//!
//! Backs the document listing and lookup the remote protocol lacks. Entries
//! live for the lifetime of the process; a persistent store plugs in behind
//! the same `DocumentMetadataStore` port.

use async_trait::async_trait;
use dashmap::DashMap;
use practicebridge_core::DocumentMetadataStore;
use practicebridge_domain::{BridgeError, Document, Result};
use tracing::debug;

/// Concurrent map from remote document id to metadata.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: DashMap<String, Document>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl DocumentMetadataStore for InMemoryDocumentStore {
    async fn save(&self, document: &Document) -> Result<()> {
        let id = document
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| BridgeError::InvalidInput("document id is required".into()))?;

        debug!(document_id = %id, "storing document metadata");
        self.documents.insert(id.to_string(), document.clone());
        Ok(())
    }

    async fn get(&self, document_id: &str) -> Result<Option<Document>> {
        Ok(self.documents.get(document_id.trim()).map(|entry| entry.value().clone()))
    }

    async fn list_for_patient(&self, patient_id: &str) -> Result<Vec<Document>> {
        let patient_id = patient_id.trim();
        let mut documents: Vec<Document> = self
            .documents
            .iter()
            .filter(|entry| entry.value().patient_id.as_deref() == Some(patient_id))
            .map(|entry| entry.value().clone())
            .collect();

        // Map iteration order is arbitrary; newest first, then by id.
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(id: &str, patient_id: &str, created_at: &str) -> Document {
        Document {
            id: Some(id.into()),
            patient_id: Some(patient_id.into()),
            name: Some(format!("doc {id}")),
            created_at: Some(created_at.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn saves_and_reads_back_by_id() {
        let store = InMemoryDocumentStore::new();
        store.save(&document("10", "501", "2025-01-01T00:00:00+00:00")).await.unwrap();

        let found = store.get(" 10 ").await.unwrap().unwrap();
        assert_eq!(found.name.as_deref(), Some("doc 10"));
        assert!(store.get("11").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lists_only_the_patients_documents_newest_first() {
        let store = InMemoryDocumentStore::new();
        store.save(&document("1", "501", "2025-01-01T00:00:00+00:00")).await.unwrap();
        store.save(&document("2", "501", "2025-02-01T00:00:00+00:00")).await.unwrap();
        store.save(&document("3", "777", "2025-03-01T00:00:00+00:00")).await.unwrap();

        let listed = store.list_for_patient("501").await.unwrap();

        let ids: Vec<_> = listed.iter().filter_map(|d| d.id.as_deref()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn resaving_replaces_the_entry() {
        let store = InMemoryDocumentStore::new();
        store.save(&document("1", "501", "2025-01-01T00:00:00+00:00")).await.unwrap();
        let mut updated = document("1", "501", "2025-01-01T00:00:00+00:00");
        updated.label = Some("Lab".into());
        store.save(&updated).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("1").await.unwrap().unwrap().label.as_deref(), Some("Lab"));
    }

    #[tokio::test]
    async fn missing_id_is_rejected() {
        let store = InMemoryDocumentStore::new();

        let err = store.save(&Document::default()).await.unwrap_err();

        assert!(matches!(err, BridgeError::InvalidInput(_)));
        assert!(store.is_empty());
    }
}
