//! Error types for document operations.

use thiserror::Error;

use crate::types::{DocumentId, VersionId};

/// Result type alias for document service operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Result type alias for storage collaborator calls.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors a caller of the document service can receive.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Title or content was blank, or a request was otherwise malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// No document with this id exists.
    #[error("document not found: {0}")]
    NotFound(DocumentId),

    /// The document exists but has no such version.
    #[error("version {version_id} not found in document {document_id}")]
    VersionNotFound {
        document_id: DocumentId,
        version_id: VersionId,
    },

    /// The acting user lacks the access level the operation needs.
    #[error("permission denied: {action} on document {document_id}")]
    PermissionDenied {
        action: &'static str,
        document_id: DocumentId,
    },

    /// The storage collaborator failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors reported by a [`DocumentStorage`](crate::storage::DocumentStorage).
#[derive(Debug, Error)]
pub enum StorageError {
    /// A compare-and-set write saw a newer generation than the one read.
    #[error("write conflict on document {0}")]
    Conflict(DocumentId),

    /// The document disappeared between read and write.
    #[error("document {0} no longer exists")]
    Missing(DocumentId),

    /// A stored record violates a document invariant.
    #[error("corrupt document record: {0}")]
    Corrupt(String),

    /// The backend itself failed (I/O, connectivity, query errors).
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StorageError {
    /// Wraps a backend error without altering it.
    pub fn backend(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Backend(err.into())
    }
}
