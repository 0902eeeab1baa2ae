//! Database models for the storage layer.
//!
//! These types map directly to database rows and are used for sqlx
//! queries. Conversions to and from the kb-core domain types are written
//! out by hand; rebuilding a [`Document`] goes through
//! [`Document::restore`] so a damaged row never becomes a live document.

use chrono::{DateTime, Utc};
use kb_core::{
    AccessLevel, Document, DocumentId, DocumentParts, Permission, StorageError, UserId, Version,
    VersionId,
};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

/// Database row for the `documents` table.
#[derive(Debug, Clone, FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub is_public: bool,
    pub mentions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub generation: i64,
}

impl DocumentRow {
    pub fn from_document(document: &Document) -> StoreResult<Self> {
        let generation = i64::try_from(document.generation()).map_err(|_| {
            StoreError::InvalidRow(format!(
                "generation {} of document {} does not fit a BIGINT",
                document.generation(),
                document.id()
            ))
        })?;

        Ok(Self {
            id: *document.id().as_uuid(),
            title: document.title().to_string(),
            content: document.content().to_string(),
            author_id: document.author_id().to_string(),
            is_public: document.is_public(),
            mentions: document.mentions().iter().map(UserId::to_string).collect(),
            created_at: document.created_at(),
            updated_at: document.updated_at(),
            generation,
        })
    }
}

/// Database row for the `document_versions` table.
#[derive(Debug, Clone, FromRow)]
pub struct VersionRow {
    pub id: Uuid,
    pub document_id: Uuid,
    /// Zero-based index in the document's history.
    pub position: i32,
    pub title: String,
    pub content: String,
    pub change_description: String,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
}

impl VersionRow {
    pub fn from_version(
        document_id: DocumentId,
        position: usize,
        version: &Version,
    ) -> StoreResult<Self> {
        let position = i32::try_from(position).map_err(|_| {
            StoreError::InvalidRow(format!("document {document_id} has too many versions"))
        })?;

        Ok(Self {
            id: *version.id.as_uuid(),
            document_id: *document_id.as_uuid(),
            position,
            title: version.title.clone(),
            content: version.content.clone(),
            change_description: version.change_description.clone(),
            author_id: version.author_id.to_string(),
            created_at: version.created_at,
        })
    }

    fn into_version(self) -> Version {
        Version {
            id: VersionId::from_uuid(self.id),
            title: self.title,
            content: self.content,
            change_description: self.change_description,
            author_id: UserId::from(self.author_id),
            created_at: self.created_at,
        }
    }
}

/// Database row for the `document_permissions` table.
#[derive(Debug, Clone, FromRow)]
pub struct PermissionRow {
    pub document_id: Uuid,
    pub user_id: String,
    /// `"view"` or `"edit"`.
    pub level: String,
    pub granted_at: DateTime<Utc>,
}

impl PermissionRow {
    pub fn from_permission(document_id: DocumentId, permission: &Permission) -> Self {
        Self {
            document_id: *document_id.as_uuid(),
            user_id: permission.user_id.to_string(),
            level: permission.level.as_str().to_string(),
            granted_at: permission.granted_at,
        }
    }

    fn into_permission(self) -> StoreResult<Permission> {
        let level: AccessLevel = self
            .level
            .parse()
            .map_err(|e| StoreError::InvalidRow(format!("document {}: {}", self.document_id, e)))?;

        Ok(Permission {
            user_id: UserId::from(self.user_id),
            level,
            granted_at: self.granted_at,
        })
    }
}

/// Database row for the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub created: DateTime<Utc>,
}

/// Rebuilds a document from its row, its version rows and its ACL rows.
///
/// Version rows must be ordered by position and numbered 0, 1, 2, ...
pub fn assemble_document(
    row: DocumentRow,
    versions: Vec<VersionRow>,
    permissions: Vec<PermissionRow>,
) -> StoreResult<Document> {
    for (expected, version) in versions.iter().enumerate() {
        if usize::try_from(version.position).ok() != Some(expected) {
            return Err(StoreError::InvalidRow(format!(
                "document {} has a gap in its history at position {}",
                row.id, expected
            )));
        }
    }

    let generation = u64::try_from(row.generation).map_err(|_| {
        StoreError::InvalidRow(format!(
            "document {} has negative generation {}",
            row.id, row.generation
        ))
    })?;

    let shared_with = permissions
        .into_iter()
        .map(PermissionRow::into_permission)
        .collect::<StoreResult<Vec<_>>>()?;

    let parts = DocumentParts {
        id: DocumentId::from_uuid(row.id),
        title: row.title,
        content: row.content,
        author_id: UserId::from(row.author_id),
        is_public: row.is_public,
        shared_with,
        mentions: row.mentions.into_iter().map(UserId::from).collect(),
        created_at: row.created_at,
        updated_at: row.updated_at,
        versions: versions.into_iter().map(VersionRow::into_version).collect(),
        generation,
    };

    Document::restore(parts).map_err(|e| match e {
        StorageError::Corrupt(message) => StoreError::InvalidRow(message),
        other => StoreError::InvalidRow(other.to_string()),
    })
}
