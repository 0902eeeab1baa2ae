//! Append-only version history.
//!
//! Every create and update produces exactly one [`Version`]. Versions are
//! pushed onto the tail of the document's history and never edited,
//! reordered or removed afterwards.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::clock::IdSource;
use crate::types::{Document, UserId, Version};

/// Change description recorded on the version created with a document.
pub const INITIAL_CHANGE_DESCRIPTION: &str = "Initial version";

/// Change description used when an update does not supply one.
pub const DEFAULT_CHANGE_DESCRIPTION: &str = "Document updated";

/// Produces versions and appends them to document histories.
#[derive(Clone)]
pub struct VersionStore {
    ids: Arc<dyn IdSource>,
}

impl VersionStore {
    pub fn new(ids: Arc<dyn IdSource>) -> Self {
        Self { ids }
    }

    /// The first version of a new document.
    pub fn initial(
        &self,
        title: &str,
        content: &str,
        author: &UserId,
        now: DateTime<Utc>,
    ) -> Version {
        self.snapshot(title, content, INITIAL_CHANGE_DESCRIPTION, author, now)
    }

    /// Appends a snapshot to the tail of `document`'s history and makes it current.
    ///
    /// A missing or blank `change_description` becomes
    /// [`DEFAULT_CHANGE_DESCRIPTION`].
    pub fn append<'a>(
        &self,
        document: &'a mut Document,
        title: &str,
        content: &str,
        change_description: Option<&str>,
        author: &UserId,
        now: DateTime<Utc>,
    ) -> &'a Version {
        let description = change_description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(DEFAULT_CHANGE_DESCRIPTION);

        let version = self.snapshot(title, content, description, author, now);
        document.title = version.title.clone();
        document.content = version.content.clone();
        document.versions.push(version);

        let last = document.versions.len() - 1;
        &document.versions[last]
    }

    fn snapshot(
        &self,
        title: &str,
        content: &str,
        change_description: &str,
        author: &UserId,
        now: DateTime<Utc>,
    ) -> Version {
        Version {
            id: self.ids.next_version_id(),
            title: title.to_string(),
            content: content.to_string(),
            change_description: change_description.to_string(),
            author_id: author.clone(),
            created_at: now,
        }
    }
}

impl fmt::Debug for VersionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::clock::SequentialIds;
    use crate::types::{DocumentId, NewDocument};

    fn store() -> VersionStore {
        VersionStore::new(Arc::new(SequentialIds::default()))
    }

    fn document(store: &VersionStore) -> Document {
        let author = UserId::from("u1");
        let now = Utc::now();
        let first = store.initial("A", "Hello", &author, now);
        NewDocument::new(author, false, BTreeSet::new(), now, first)
            .into_document(DocumentId::new())
    }

    #[test]
    fn initial_version_is_labelled() {
        let store = store();
        let v = store.initial("A", "Hello", &UserId::from("u1"), Utc::now());
        assert_eq!(v.change_description, "Initial version");
        assert_eq!(v.title, "A");
        assert_eq!(v.content, "Hello");
    }

    #[test]
    fn append_keeps_prior_versions() {
        let store = store();
        let mut doc = document(&store);
        let before = doc.versions()[0].clone();

        let editor = UserId::from("u1");
        let appended = store
            .append(&mut doc, "A2", "World", Some("edit1"), &editor, Utc::now())
            .clone();

        assert_eq!(doc.versions().len(), 2);
        assert_eq!(doc.versions()[0], before);
        assert_eq!(appended.change_description, "edit1");
        assert_eq!(doc.latest_version(), Some(&appended));
        assert_eq!(doc.title(), "A2");
        assert_eq!(doc.content(), "World");
    }

    #[test]
    fn append_defaults_description() {
        let store = store();
        let mut doc = document(&store);
        let editor = UserId::from("u1");

        store.append(&mut doc, "A", "x", None, &editor, Utc::now());
        store.append(&mut doc, "A", "y", Some("   "), &editor, Utc::now());

        assert_eq!(doc.versions()[1].change_description, "Document updated");
        assert_eq!(doc.versions()[2].change_description, "Document updated");
    }

    #[test]
    fn appended_ids_are_unique() {
        let store = store();
        let mut doc = document(&store);
        let editor = UserId::from("u2");
        for i in 0..5 {
            store.append(&mut doc, "A", &format!("rev {i}"), None, &editor, Utc::now());
        }
        let ids: BTreeSet<_> = doc.versions().iter().map(|v| v.id).collect();
        assert_eq!(ids.len(), 6);
        assert_eq!(doc.versions()[5].author_id, editor);
    }
}
