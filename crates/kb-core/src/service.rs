//! Document lifecycle: create, read, update, delete and sharing.
//!
//! Every write follows the same shape: read the document, check the acting
//! user's access, apply the change in memory, then write it back with a
//! compare-and-set on its generation. A conflicting write re-runs the whole
//! sequence against a fresh read, so permission checks always see the state
//! that is actually being replaced.

use std::sync::Arc;

use crate::clock::{Clock, IdSource, RandomIds, SystemClock};
use crate::error::{DocumentError, DocumentResult, StorageError};
use crate::mentions::{MentionExtractor, UserDirectory};
use crate::permissions::PermissionManager;
use crate::search::SearchIndex;
use crate::storage::DocumentStorage;
use crate::types::{AccessLevel, Document, DocumentId, NewDocument, UserId, Version, VersionId};
use crate::versions::VersionStore;

/// How many times a write is attempted before a conflict is surfaced.
pub const MAX_WRITE_ATTEMPTS: usize = 8;

/// Orchestrates versions, permissions, mentions and search over a storage.
pub struct DocumentService {
    storage: Arc<dyn DocumentStorage>,
    versions: VersionStore,
    mentions: MentionExtractor,
    clock: Arc<dyn Clock>,
}

impl DocumentService {
    /// Creates a service on wall-clock time and random version ids, with
    /// mention resolution disabled.
    pub fn new(storage: Arc<dyn DocumentStorage>) -> Self {
        Self {
            storage,
            versions: VersionStore::new(Arc::new(RandomIds)),
            mentions: MentionExtractor::disabled(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the time source (builder pattern).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the version id source (builder pattern).
    pub fn with_id_source(mut self, ids: Arc<dyn IdSource>) -> Self {
        self.versions = VersionStore::new(ids);
        self
    }

    /// Resolves `@username` mentions through `directory` (builder pattern).
    pub fn with_user_directory(mut self, directory: Arc<dyn UserDirectory>) -> Self {
        self.mentions = MentionExtractor::new(directory);
        self
    }

    /// The storage this service writes through.
    pub fn storage(&self) -> &Arc<dyn DocumentStorage> {
        &self.storage
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Creates a document with its initial version.
    ///
    /// # Errors
    ///
    /// [`DocumentError::Validation`] if the title or content is blank.
    pub async fn create(
        &self,
        title: &str,
        content: &str,
        is_public: bool,
        author_id: &UserId,
    ) -> DocumentResult<Document> {
        validate(title, content)?;

        let now = self.clock.now();
        let mentions = self.mentions.extract(content).await;
        let first = self.versions.initial(title, content, author_id, now);
        let draft = NewDocument::new(author_id.clone(), is_public, mentions, now, first);

        let document = self.storage.insert(draft).await?;
        tracing::info!(
            document_id = %document.id(),
            user_id = %author_id,
            is_public,
            "Document created"
        );
        Ok(document)
    }

    /// Fetches a document the requester may view.
    pub async fn get(&self, id: DocumentId, requester_id: &UserId) -> DocumentResult<Document> {
        let document = self.require(id).await?;
        if !PermissionManager::can_view(&document, requester_id) {
            return Err(DocumentError::PermissionDenied {
                action: "view",
                document_id: id,
            });
        }
        Ok(document)
    }

    /// Appends a new version carrying `title` and `content`.
    ///
    /// Needs edit access. Mentions are recomputed from the new content and
    /// `updated_at` moves to now.
    pub async fn update(
        &self,
        id: DocumentId,
        title: &str,
        content: &str,
        change_description: Option<&str>,
        editor_id: &UserId,
    ) -> DocumentResult<Document> {
        require_editor(&self.require(id).await?, editor_id)?;
        let mentions = self.mentions.extract(content).await;

        let document = self
            .modify(id, |document| {
                require_editor(document, editor_id)?;
                validate(title, content)?;

                let now = self.clock.now();
                self.versions
                    .append(document, title, content, change_description, editor_id, now);
                document.updated_at = now;
                document.mentions = mentions.clone();
                Ok(true)
            })
            .await?;

        tracing::info!(
            document_id = %id,
            user_id = %editor_id,
            versions = document.versions().len(),
            "Document updated"
        );
        Ok(document)
    }

    /// Removes a document together with its history and grants. Author only.
    pub async fn delete(&self, id: DocumentId, requester_id: &UserId) -> DocumentResult<()> {
        let document = self.require(id).await?;
        require_owner(&document, requester_id, "delete")?;

        if !self.storage.delete_by_id(id).await? {
            return Err(DocumentError::NotFound(id));
        }

        tracing::info!(document_id = %id, user_id = %requester_id, "Document deleted");
        Ok(())
    }

    // ========================================================================
    // Sharing
    // ========================================================================

    /// Grants `level` on the document to `user_id`. Author only.
    ///
    /// Re-sharing with the same user replaces the earlier grant.
    pub async fn share(
        &self,
        id: DocumentId,
        owner_id: &UserId,
        user_id: &UserId,
        level: AccessLevel,
    ) -> DocumentResult<Document> {
        let document = self
            .modify(id, |document| {
                require_owner(document, owner_id, "share")?;
                if user_id.as_str().trim().is_empty() {
                    return Err(DocumentError::Validation(
                        "user id must not be blank".to_string(),
                    ));
                }
                if PermissionManager::is_owner(document, user_id) {
                    return Err(DocumentError::Validation(
                        "cannot share a document with its author".to_string(),
                    ));
                }
                PermissionManager::grant(document, user_id.clone(), level, self.clock.now());
                Ok(true)
            })
            .await?;

        tracing::info!(
            document_id = %id,
            user_id = %owner_id,
            grantee = %user_id,
            level = %level,
            "Document shared"
        );
        Ok(document)
    }

    /// Withdraws any grant `user_id` holds. Author only; a no-op if none.
    pub async fn revoke(
        &self,
        id: DocumentId,
        owner_id: &UserId,
        user_id: &UserId,
    ) -> DocumentResult<Document> {
        let document = self
            .modify(id, |document| {
                require_owner(document, owner_id, "revoke")?;
                Ok(PermissionManager::revoke(document, user_id))
            })
            .await?;

        tracing::info!(
            document_id = %id,
            user_id = %owner_id,
            grantee = %user_id,
            "Document access revoked"
        );
        Ok(document)
    }

    /// Makes the document public or private. Author only.
    pub async fn set_visibility(
        &self,
        id: DocumentId,
        owner_id: &UserId,
        is_public: bool,
    ) -> DocumentResult<Document> {
        let document = self
            .modify(id, |document| {
                require_owner(document, owner_id, "change visibility of")?;
                if document.is_public == is_public {
                    return Ok(false);
                }
                document.is_public = is_public;
                Ok(true)
            })
            .await?;

        tracing::info!(document_id = %id, user_id = %owner_id, is_public, "Visibility changed");
        Ok(document)
    }

    // ========================================================================
    // History
    // ========================================================================

    /// The full version list, oldest first. Gated like [`get`](Self::get).
    pub async fn history(
        &self,
        id: DocumentId,
        requester_id: &UserId,
    ) -> DocumentResult<Vec<Version>> {
        let document = self.get(id, requester_id).await?;
        Ok(document.into_parts().versions)
    }

    /// One version of a document. Gated like [`get`](Self::get).
    pub async fn version(
        &self,
        id: DocumentId,
        version_id: VersionId,
        requester_id: &UserId,
    ) -> DocumentResult<Version> {
        self.history(id, requester_id)
            .await?
            .into_iter()
            .find(|v| v.id == version_id)
            .ok_or(DocumentError::VersionNotFound {
                document_id: id,
                version_id,
            })
    }

    // ========================================================================
    // Listing & Search
    // ========================================================================

    pub async fn list_public(&self) -> DocumentResult<Vec<Document>> {
        Ok(SearchIndex::list_public(self.storage.find_all().await?))
    }

    /// Every document `author_id` created, regardless of visibility.
    pub async fn list_by_author(&self, author_id: &UserId) -> DocumentResult<Vec<Document>> {
        Ok(SearchIndex::list_by_author(
            self.storage.find_all().await?,
            author_id,
        ))
    }

    /// Documents the requester can view: public, authored or shared.
    pub async fn list_accessible(&self, requester_id: &UserId) -> DocumentResult<Vec<Document>> {
        Ok(SearchIndex::list_accessible(
            self.storage.find_all().await?,
            requester_id,
        ))
    }

    /// Case-insensitive substring search over titles and contents.
    ///
    /// Searches public documents plus the requester's own private ones.
    /// Without a requester only public documents are searched.
    pub async fn search(
        &self,
        term: &str,
        requester_id: Option<&UserId>,
    ) -> DocumentResult<Vec<Document>> {
        let searchable = self
            .storage
            .find_all()
            .await?
            .into_iter()
            .filter(|doc| doc.is_public || Some(&doc.author_id) == requester_id)
            .collect();

        Ok(SearchIndex::search(searchable, term))
    }

    // ========================================================================
    // Internals
    // ========================================================================

    async fn require(&self, id: DocumentId) -> DocumentResult<Document> {
        self.storage
            .find_by_id(id)
            .await?
            .ok_or(DocumentError::NotFound(id))
    }

    /// Read, apply, compare-and-set, retrying on conflict.
    ///
    /// `apply` returns whether it changed anything; an unchanged document is
    /// returned as read without a write.
    async fn modify<F>(&self, id: DocumentId, mut apply: F) -> DocumentResult<Document>
    where
        F: FnMut(&mut Document) -> DocumentResult<bool> + Send,
    {
        let mut attempt = 1;
        loop {
            let mut document = self.require(id).await?;
            if !apply(&mut document)? {
                return Ok(document);
            }

            match self.storage.replace(&document).await {
                Ok(stored) => return Ok(stored),
                Err(StorageError::Conflict(_)) if attempt < MAX_WRITE_ATTEMPTS => {
                    tracing::debug!(document_id = %id, attempt, "Write conflict, retrying");
                    attempt += 1;
                }
                Err(StorageError::Missing(_)) => return Err(DocumentError::NotFound(id)),
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl std::fmt::Debug for DocumentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentService")
            .field("versions", &self.versions)
            .field("mentions", &self.mentions)
            .finish_non_exhaustive()
    }
}

fn validate(title: &str, content: &str) -> DocumentResult<()> {
    if title.trim().is_empty() {
        return Err(DocumentError::Validation("title must not be blank".to_string()));
    }
    if content.trim().is_empty() {
        return Err(DocumentError::Validation("content must not be blank".to_string()));
    }
    Ok(())
}

fn require_owner(
    document: &Document,
    user_id: &UserId,
    action: &'static str,
) -> DocumentResult<()> {
    if PermissionManager::is_owner(document, user_id) {
        Ok(())
    } else {
        Err(DocumentError::PermissionDenied {
            action,
            document_id: document.id,
        })
    }
}

fn require_editor(document: &Document, user_id: &UserId) -> DocumentResult<()> {
    if PermissionManager::can_edit(document, user_id) {
        Ok(())
    } else {
        Err(DocumentError::PermissionDenied {
            action: "edit",
            document_id: document.id,
        })
    }
}
