//! Core data types for the knowledge base.
//!
//! A [`Document`] carries its current title and content, an append-only
//! history of [`Version`] snapshots, a sharing list of [`Permission`]
//! grants and the set of users mentioned in its content.
//!
//! The fields that carry invariants (history, current text, ACL, mentions,
//! generation) are private to this crate. They change only through
//! [`VersionStore`](crate::versions::VersionStore),
//! [`PermissionManager`](crate::permissions::PermissionManager) and
//! [`DocumentService`](crate::service::DocumentService). Storage backends
//! rebuild documents with [`Document::restore`], which validates them.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StorageError;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for a document.
///
/// Assigned by the storage collaborator when the document is first persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    /// Creates a new random DocumentId using UUID v4.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a DocumentId from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Unique identifier for one version in a document's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(pub Uuid);

impl VersionId {
    /// Creates a new random VersionId using UUID v4.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a VersionId from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for VersionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VersionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Identifier of a user, as issued by whatever authenticates requests.
///
/// Opaque and compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a UserId from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ============================================================================
// Permission Types
// ============================================================================

/// Access level a user holds on a document.
///
/// Ordered so that `Edit > View`; holding `Edit` implies `View`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// May read the document and its history.
    View,
    /// May also append new versions.
    Edit,
}

impl AccessLevel {
    /// The lowercase name used in JSON and in storage rows.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = AccessLevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(Self::View),
            "edit" => Ok(Self::Edit),
            other => Err(AccessLevelParseError(other.to_string())),
        }
    }
}

/// Error type for parsing an AccessLevel from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessLevelParseError(pub String);

impl fmt::Display for AccessLevelParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid access level {:?}: expected \"view\" or \"edit\"", self.0)
    }
}

impl std::error::Error for AccessLevelParseError {}

/// A sharing grant of one access level to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// The user the grant applies to.
    pub user_id: UserId,

    /// What the user may do.
    pub level: AccessLevel,

    /// When the grant was made (or last replaced).
    pub granted_at: DateTime<Utc>,
}

// ============================================================================
// Core Domain Types
// ============================================================================

/// An immutable snapshot of a document at one point in its history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Unique identifier for this version.
    pub id: VersionId,

    /// Title at the time of the snapshot.
    pub title: String,

    /// Content at the time of the snapshot.
    pub content: String,

    /// Free-text note describing the change.
    pub change_description: String,

    /// The user who produced this version.
    pub author_id: UserId,

    /// When the version was appended.
    pub created_at: DateTime<Utc>,
}

/// A knowledge-base document with its full version history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub(crate) id: DocumentId,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) author_id: UserId,
    pub(crate) is_public: bool,
    pub(crate) shared_with: Vec<Permission>,
    pub(crate) mentions: BTreeSet<UserId>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) versions: Vec<Version>,
    pub(crate) generation: u64,
}

impl Document {
    /// Rebuilds a document from its stored parts.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Corrupt`] if the history is empty, if the
    /// current title/content differ from the latest version, or if the
    /// sharing list names a user more than once.
    pub fn restore(parts: DocumentParts) -> Result<Self, StorageError> {
        let Some(latest) = parts.versions.last() else {
            return Err(StorageError::Corrupt(format!(
                "document {} has no versions",
                parts.id
            )));
        };

        if latest.title != parts.title || latest.content != parts.content {
            return Err(StorageError::Corrupt(format!(
                "document {} does not match its latest version {}",
                parts.id, latest.id
            )));
        }

        let mut seen = BTreeSet::new();
        for permission in &parts.shared_with {
            if !seen.insert(&permission.user_id) {
                return Err(StorageError::Corrupt(format!(
                    "document {} shares with {} more than once",
                    parts.id, permission.user_id
                )));
            }
        }

        Ok(Self {
            id: parts.id,
            title: parts.title,
            content: parts.content,
            author_id: parts.author_id,
            is_public: parts.is_public,
            shared_with: parts.shared_with,
            mentions: parts.mentions,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
            versions: parts.versions,
            generation: parts.generation,
        })
    }

    /// Unique identifier for this document.
    #[must_use]
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Current title (always equal to the latest version's title).
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Current content (always equal to the latest version's content).
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The user who created the document.
    #[must_use]
    pub fn author_id(&self) -> &UserId {
        &self.author_id
    }

    /// Whether every user may view the document.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.is_public
    }

    /// Explicit sharing grants, at most one per user.
    #[must_use]
    pub fn shared_with(&self) -> &[Permission] {
        &self.shared_with
    }

    /// Users mentioned in the current content.
    #[must_use]
    pub fn mentions(&self) -> &BTreeSet<UserId> {
        &self.mentions
    }

    /// When the document was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the content was last updated.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Full history, oldest first. Never empty.
    #[must_use]
    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    /// The most recent version.
    #[must_use]
    pub fn latest_version(&self) -> Option<&Version> {
        self.versions.last()
    }

    /// Storage concurrency token, bumped on every successful write.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Splits the document into its stored parts.
    #[must_use]
    pub fn into_parts(self) -> DocumentParts {
        DocumentParts {
            id: self.id,
            title: self.title,
            content: self.content,
            author_id: self.author_id,
            is_public: self.is_public,
            shared_with: self.shared_with,
            mentions: self.mentions,
            created_at: self.created_at,
            updated_at: self.updated_at,
            versions: self.versions,
            generation: self.generation,
        }
    }

    /// Returns a copy carrying the next generation, as storage writes it.
    #[must_use]
    pub fn next_generation(&self) -> Self {
        let mut next = self.clone();
        next.generation += 1;
        next
    }
}

/// The plain fields of a [`Document`], used by storage backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentParts {
    pub id: DocumentId,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub is_public: bool,
    pub shared_with: Vec<Permission>,
    pub mentions: BTreeSet<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub versions: Vec<Version>,
    pub generation: u64,
}

/// A document that has not been persisted yet and so has no id.
///
/// Built by the service with its first version already in place; storage
/// turns it into a [`Document`] with [`NewDocument::into_document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    author_id: UserId,
    is_public: bool,
    mentions: BTreeSet<UserId>,
    created_at: DateTime<Utc>,
    first_version: Version,
}

impl NewDocument {
    pub(crate) fn new(
        author_id: UserId,
        is_public: bool,
        mentions: BTreeSet<UserId>,
        created_at: DateTime<Utc>,
        first_version: Version,
    ) -> Self {
        Self {
            author_id,
            is_public,
            mentions,
            created_at,
            first_version,
        }
    }

    /// The user creating the document.
    #[must_use]
    pub fn author_id(&self) -> &UserId {
        &self.author_id
    }

    /// Assigns an id and produces the first stored generation.
    #[must_use]
    pub fn into_document(self, id: DocumentId) -> Document {
        Document {
            id,
            title: self.first_version.title.clone(),
            content: self.first_version.content.clone(),
            author_id: self.author_id,
            is_public: self.is_public,
            shared_with: Vec::new(),
            mentions: self.mentions,
            created_at: self.created_at,
            updated_at: self.created_at,
            versions: vec![self.first_version],
            generation: 1,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn version(title: &str, content: &str) -> Version {
        Version {
            id: VersionId::new(),
            title: title.to_string(),
            content: content.to_string(),
            change_description: "Initial version".to_string(),
            author_id: UserId::from("u1"),
            created_at: Utc::now(),
        }
    }

    fn parts(versions: Vec<Version>) -> DocumentParts {
        let now = Utc::now();
        DocumentParts {
            id: DocumentId::new(),
            title: "A".to_string(),
            content: "Hello".to_string(),
            author_id: UserId::from("u1"),
            is_public: false,
            shared_with: Vec::new(),
            mentions: BTreeSet::new(),
            created_at: now,
            updated_at: now,
            versions,
            generation: 1,
        }
    }

    #[test]
    fn document_id_display_fromstr() {
        let id = DocumentId::new();
        let parsed: DocumentId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn user_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&UserId::from("alice")).unwrap();
        assert_eq!(json, "\"alice\"");
    }

    #[test]
    fn access_level_ordering() {
        assert!(AccessLevel::Edit > AccessLevel::View);
    }

    #[test]
    fn access_level_parse() {
        assert_eq!("view".parse::<AccessLevel>().unwrap(), AccessLevel::View);
        assert_eq!("edit".parse::<AccessLevel>().unwrap(), AccessLevel::Edit);
        assert!("Edit".parse::<AccessLevel>().is_err());
        assert_eq!(
            serde_json::to_string(&AccessLevel::Edit).unwrap(),
            "\"edit\""
        );
    }

    #[test]
    fn new_document_starts_at_generation_one() {
        let first = version("A", "Hello");
        let draft = NewDocument::new(
            UserId::from("u1"),
            true,
            BTreeSet::new(),
            first.created_at,
            first.clone(),
        );
        let id = DocumentId::new();
        let doc = draft.into_document(id);

        assert_eq!(doc.id(), id);
        assert_eq!(doc.generation(), 1);
        assert_eq!(doc.versions(), &[first]);
        assert_eq!(doc.title(), "A");
        assert_eq!(doc.created_at(), doc.updated_at());
        assert!(doc.shared_with().is_empty());
    }

    #[test]
    fn restore_rejects_empty_history() {
        let result = Document::restore(parts(vec![]));
        assert!(matches!(result, Err(StorageError::Corrupt(_))));
    }

    #[test]
    fn restore_rejects_stale_current_text() {
        let result = Document::restore(parts(vec![version("A", "Bye")]));
        assert!(matches!(result, Err(StorageError::Corrupt(_))));
    }

    #[test]
    fn restore_rejects_duplicate_grants() {
        let mut p = parts(vec![version("A", "Hello")]);
        let grant = Permission {
            user_id: UserId::from("u2"),
            level: AccessLevel::View,
            granted_at: Utc::now(),
        };
        p.shared_with = vec![grant.clone(), grant];
        assert!(matches!(
            Document::restore(p),
            Err(StorageError::Corrupt(_))
        ));
    }

    #[test]
    fn restore_roundtrips_parts() {
        let p = parts(vec![version("A", "Hello")]);
        let doc = Document::restore(p.clone()).unwrap();
        assert_eq!(doc.into_parts(), p);
    }

    #[test]
    fn document_serializes_history() {
        let doc = Document::restore(parts(vec![version("A", "Hello")])).unwrap();
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["title"], "A");
        assert_eq!(json["versions"][0]["change_description"], "Initial version");
        assert_eq!(json["is_public"], false);
    }
}
