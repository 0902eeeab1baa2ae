//! The storage seam the document service depends on.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::types::{Document, DocumentId, NewDocument};

/// Persists whole documents, history and ACL included.
///
/// Writes are compare-and-set on [`Document::generation`]: `replace` only
/// succeeds if the stored generation still equals the one on the document
/// passed in, and the stored copy then carries the next generation.
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Assigns a fresh id and stores the document at generation 1.
    async fn insert(&self, document: NewDocument) -> StorageResult<Document>;

    async fn find_by_id(&self, id: DocumentId) -> StorageResult<Option<Document>>;

    /// Every stored document, in no particular order.
    async fn find_all(&self) -> StorageResult<Vec<Document>>;

    /// Writes `document` over the stored copy.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Missing`](crate::error::StorageError::Missing) if
    ///   the document is gone.
    /// - [`StorageError::Conflict`](crate::error::StorageError::Conflict) if
    ///   another write landed since `document` was read.
    async fn replace(&self, document: &Document) -> StorageResult<Document>;

    /// Removes the document and its history. Returns whether it existed.
    async fn delete_by_id(&self, id: DocumentId) -> StorageResult<bool>;
}
