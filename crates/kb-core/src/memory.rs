//! In-memory [`DocumentStorage`] for tests and database-less runs.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{StorageError, StorageResult};
use crate::storage::DocumentStorage;
use crate::types::{Document, DocumentId, NewDocument};

/// Documents held in a map behind an async lock.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    documents: RwLock<HashMap<DocumentId, Document>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStorage for InMemoryStorage {
    async fn insert(&self, document: NewDocument) -> StorageResult<Document> {
        let mut documents = self.documents.write().await;
        let mut id = DocumentId::new();
        while documents.contains_key(&id) {
            id = DocumentId::new();
        }

        let stored = document.into_document(id);
        documents.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: DocumentId) -> StorageResult<Option<Document>> {
        Ok(self.documents.read().await.get(&id).cloned())
    }

    async fn find_all(&self) -> StorageResult<Vec<Document>> {
        Ok(self.documents.read().await.values().cloned().collect())
    }

    async fn replace(&self, document: &Document) -> StorageResult<Document> {
        let mut documents = self.documents.write().await;
        let Some(current) = documents.get(&document.id) else {
            return Err(StorageError::Missing(document.id));
        };

        if current.generation != document.generation {
            return Err(StorageError::Conflict(document.id));
        }

        // History is append-only: the stored prefix must survive unchanged.
        if document.versions.len() < current.versions.len()
            || document.versions[..current.versions.len()] != current.versions[..]
        {
            return Err(StorageError::Corrupt(format!(
                "write to document {} rewrites its history",
                document.id
            )));
        }

        let stored = document.next_generation();
        documents.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn delete_by_id(&self, id: DocumentId) -> StorageResult<bool> {
        Ok(self.documents.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Utc;

    use super::*;
    use crate::types::{UserId, Version, VersionId};

    fn draft(title: &str) -> NewDocument {
        let now = Utc::now();
        let first = Version {
            id: VersionId::new(),
            title: title.to_string(),
            content: "body".to_string(),
            change_description: "Initial version".to_string(),
            author_id: UserId::from("u1"),
            created_at: now,
        };
        NewDocument::new(UserId::from("u1"), false, BTreeSet::new(), now, first)
    }

    #[tokio::test]
    async fn insert_assigns_distinct_ids() {
        let storage = InMemoryStorage::new();
        let a = storage.insert(draft("A")).await.unwrap();
        let b = storage.insert(draft("B")).await.unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(storage.len().await, 2);
        assert_eq!(a.generation(), 1);
    }

    #[tokio::test]
    async fn replace_bumps_generation() {
        let storage = InMemoryStorage::new();
        let mut doc = storage.insert(draft("A")).await.unwrap();
        doc.is_public = true;

        let stored = storage.replace(&doc).await.unwrap();
        assert_eq!(stored.generation(), 2);
        assert!(storage.find_by_id(doc.id()).await.unwrap().unwrap().is_public());
    }

    #[tokio::test]
    async fn stale_replace_conflicts() {
        let storage = InMemoryStorage::new();
        let doc = storage.insert(draft("A")).await.unwrap();
        storage.replace(&doc).await.unwrap();

        let err = storage.replace(&doc).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict(id) if id == doc.id()));
    }

    #[tokio::test]
    async fn replace_missing_document() {
        let storage = InMemoryStorage::new();
        let doc = storage.insert(draft("A")).await.unwrap();
        assert!(storage.delete_by_id(doc.id()).await.unwrap());

        let err = storage.replace(&doc).await.unwrap_err();
        assert!(matches!(err, StorageError::Missing(_)));
    }

    #[tokio::test]
    async fn replace_rejects_truncated_history() {
        let storage = InMemoryStorage::new();
        let mut doc = storage.insert(draft("A")).await.unwrap();
        doc.versions.clear();

        let err = storage.replace(&doc).await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(_)));
    }

    #[tokio::test]
    async fn delete_reports_absence() {
        let storage = InMemoryStorage::new();
        assert!(!storage.delete_by_id(DocumentId::new()).await.unwrap());
        assert!(storage.is_empty().await);
    }
}
