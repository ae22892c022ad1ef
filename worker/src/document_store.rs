//! In-memory `DocumentStore` (spec §4.8). The only implementation in
//! scope — a relational store is a documented extension point on the trait
//! itself, not something this crate builds.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use kgx_core::errors::{CoreError, CoreResult};
use kgx_core::traits::DocumentStore;
use kgx_core::types::{Document, JobState};

struct Record {
    document: Document,
    content: String,
}

/// Holds every ingested document's metadata and raw content for the life of
/// the process. Seeded via `insert`, mutated by the orchestrator's caller
/// through `update_document`.
pub struct InMemoryDocumentStore {
    records: RwLock<HashMap<Uuid, Record>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, document: Document, content: String) {
        self.records
            .write()
            .unwrap()
            .insert(document.doc_id, Record { document, content });
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn query_pending(&self, limit: Option<usize>) -> CoreResult<Vec<Document>> {
        let records = self.records.read().unwrap();
        let mut pending: Vec<Document> = records
            .values()
            .filter(|r| r.document.extraction_state == JobState::Pending)
            .map(|r| r.document.clone())
            .collect();
        pending.sort_by_key(|d| d.ingested_at);
        if let Some(limit) = limit {
            pending.truncate(limit);
        }
        Ok(pending)
    }

    async fn get_content(&self, doc_id: Uuid) -> CoreResult<String> {
        self.records
            .read()
            .unwrap()
            .get(&doc_id)
            .map(|r| r.content.clone())
            .ok_or_else(|| CoreError::Internal(format!("document {doc_id} not found")))
    }

    async fn update_document(&self, doc: Document) -> CoreResult<()> {
        let mut records = self.records.write().unwrap();
        match records.get_mut(&doc.doc_id) {
            Some(record) => {
                record.document = doc;
                Ok(())
            }
            None => Err(CoreError::Internal(format!(
                "document {} not found",
                doc.doc_id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgx_core::types::SourceType;

    #[tokio::test]
    async fn query_pending_excludes_completed_documents() {
        let store = InMemoryDocumentStore::new();
        let pending_doc = Document::new("http://a", SourceType::Web, "a".repeat(64));
        let mut done_doc = Document::new("http://b", SourceType::Web, "b".repeat(64));
        done_doc.extraction_state = JobState::Completed;

        store.insert(pending_doc.clone(), "content a".to_string());
        store.insert(done_doc, "content b".to_string());

        let pending = store.query_pending(None).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].doc_id, pending_doc.doc_id);
    }

    #[tokio::test]
    async fn get_content_fails_for_unknown_doc() {
        let store = InMemoryDocumentStore::new();
        assert!(store.get_content(Uuid::new_v4()).await.is_err());
    }

    #[tokio::test]
    async fn update_document_persists_new_state() {
        let store = InMemoryDocumentStore::new();
        let doc = Document::new("http://a", SourceType::Web, "a".repeat(64));
        store.insert(doc.clone(), "content".to_string());

        let mut updated = doc.clone();
        updated.extraction_state = JobState::Completed;
        store.update_document(updated).await.unwrap();

        let pending = store.query_pending(None).await.unwrap();
        assert!(pending.is_empty());
    }
}
