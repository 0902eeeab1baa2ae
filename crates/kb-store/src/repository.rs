//! Repository layer exposing the store through the kb-core capabilities.
//!
//! [`Repository`] implements [`DocumentStorage`] and [`UserDirectory`] on top
//! of [`Store`], translating store results into [`StorageError`]s.

use async_trait::async_trait;
use kb_core::{
    Document, DocumentId, DocumentStorage, NewDocument, StorageError, StorageResult, UserDirectory,
    UserId,
};

use crate::Store;
use crate::store::WriteOutcome;

/// Domain-typed access to the store.
#[derive(Debug, Clone)]
pub struct Repository {
    store: Store,
}

impl Repository {
    /// Create a new repository wrapping the given store.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Get reference to the underlying store.
    pub fn store(&self) -> &Store {
        &self.store
    }
}

#[async_trait]
impl DocumentStorage for Repository {
    async fn insert(&self, document: NewDocument) -> StorageResult<Document> {
        let document = document.into_document(DocumentId::new());
        self.store.insert_document(&document).await?;
        Ok(document)
    }

    async fn find_by_id(&self, id: DocumentId) -> StorageResult<Option<Document>> {
        Ok(self.store.get_document(id).await?)
    }

    async fn find_all(&self) -> StorageResult<Vec<Document>> {
        Ok(self.store.list_documents().await?)
    }

    async fn replace(&self, document: &Document) -> StorageResult<Document> {
        match self.store.replace_document(document).await? {
            WriteOutcome::Written(stored) => Ok(stored),
            WriteOutcome::Stale => Err(StorageError::Conflict(document.id())),
            WriteOutcome::Missing => Err(StorageError::Missing(document.id())),
        }
    }

    async fn delete_by_id(&self, id: DocumentId) -> StorageResult<bool> {
        Ok(self.store.delete_document(id).await?)
    }
}

#[async_trait]
impl UserDirectory for Repository {
    async fn resolve(&self, username: &str) -> StorageResult<Option<UserId>> {
        let user = self.store.get_user_by_username(username).await?;
        Ok(user.map(|row| UserId::from(row.id)))
    }
}

/// Integration tests that require a running PostgreSQL database.
/// Run with: cargo test --features integration-tests
#[cfg(all(test, feature = "integration-tests"))]
mod integration_tests {
    use std::sync::Arc;

    use kb_core::{AccessLevel, DocumentError, DocumentService};
    use uuid::Uuid;

    use super::*;
    use crate::{Store, StoreConfig};

    async fn setup_repository() -> Repository {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| StoreConfig::default().database_url);
        let store = Store::connect(StoreConfig::with_url(database_url))
            .await
            .expect("Failed to connect to database");
        Repository::new(store)
    }

    fn unique_user(prefix: &str) -> UserId {
        UserId::from(format!("{prefix}-{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_document_lifecycle() {
        let repo = Arc::new(setup_repository().await);
        let service = DocumentService::new(repo.clone());
        let author = unique_user("author");
        let reader = unique_user("reader");

        let doc = service.create("A", "Hello", false, &author).await.unwrap();
        let doc = service
            .update(doc.id(), "A2", "World", Some("edit1"), &author)
            .await
            .unwrap();
        assert_eq!(doc.versions().len(), 2);

        service
            .share(doc.id(), &author, &reader, AccessLevel::View)
            .await
            .unwrap();

        let stored = repo.find_by_id(doc.id()).await.unwrap().unwrap();
        assert_eq!(stored.versions().len(), 2);
        assert_eq!(stored.versions()[1].change_description, "edit1");
        assert_eq!(stored.shared_with().len(), 1);
        assert_eq!(stored.generation(), 3);

        service.delete(doc.id(), &author).await.unwrap();
        assert!(repo.find_by_id(doc.id()).await.unwrap().is_none());
        assert!(matches!(
            service.get(doc.id(), &author).await,
            Err(DocumentError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_stale_replace_conflicts() {
        let repo = setup_repository().await;
        let service = DocumentService::new(Arc::new(repo.clone()));
        let author = unique_user("author");

        let doc = service.create("A", "Hello", false, &author).await.unwrap();
        repo.replace(&doc).await.unwrap();

        let err = repo.replace(&doc).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));

        repo.delete_by_id(doc.id()).await.unwrap();
        let err = repo.replace(&doc).await.unwrap_err();
        assert!(matches!(err, StorageError::Missing(_)));
    }

    #[tokio::test]
    async fn test_concurrent_updates() {
        let repo = Arc::new(setup_repository().await);
        let service = Arc::new(DocumentService::new(repo.clone()));
        let author = unique_user("author");
        let doc = service.create("A", "v0", false, &author).await.unwrap();

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..8 {
            let service = service.clone();
            let author = author.clone();
            let id = doc.id();
            tasks.spawn(async move {
                service
                    .update(id, "A", &format!("v{}", i + 1), None, &author)
                    .await
                    .is_ok()
            });
        }

        let mut successes = 0;
        while let Some(result) = tasks.join_next().await {
            if result.unwrap() {
                successes += 1;
            }
        }

        let stored = repo.find_by_id(doc.id()).await.unwrap().unwrap();
        assert_eq!(stored.versions().len(), 1 + successes);
    }

    #[tokio::test]
    async fn test_user_directory() {
        let repo = setup_repository().await;
        let id = unique_user("user");
        let username = format!("name_{}", Uuid::new_v4().simple());
        repo.store().upsert_user(id.as_str(), &username).await.unwrap();

        assert_eq!(repo.resolve(&username).await.unwrap(), Some(id));
        assert_eq!(repo.resolve("no_such_user_here").await.unwrap(), None);
    }
}
