//! Substring search and filtered listings over a document snapshot.
//!
//! All functions are pure: they take the documents the storage returned and
//! hand back the matching ones ordered by id, so the result is stable for a
//! fixed store state.

use crate::permissions::PermissionManager;
use crate::types::{Document, UserId};

/// Lookup over titles and contents, and listing filters.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchIndex;

impl SearchIndex {
    /// Documents whose title or content contains `term`, ignoring case.
    ///
    /// A blank term matches nothing. Otherwise the term is matched as
    /// given, surrounding whitespace included.
    pub fn search(documents: Vec<Document>, term: &str) -> Vec<Document> {
        if term.trim().is_empty() {
            return Vec::new();
        }
        let needle = term.to_lowercase();

        Self::filter(documents, |doc| {
            doc.title.to_lowercase().contains(&needle)
                || doc.content.to_lowercase().contains(&needle)
        })
    }

    /// Documents flagged public.
    pub fn list_public(documents: Vec<Document>) -> Vec<Document> {
        Self::filter(documents, |doc| doc.is_public)
    }

    /// Documents created by `author_id`.
    ///
    /// No authorization happens here; callers decide who may see the list.
    pub fn list_by_author(documents: Vec<Document>, author_id: &UserId) -> Vec<Document> {
        Self::filter(documents, |doc| &doc.author_id == author_id)
    }

    /// Documents `user_id` can at least view: public, authored or shared.
    pub fn list_accessible(documents: Vec<Document>, user_id: &UserId) -> Vec<Document> {
        Self::filter(documents, |doc| PermissionManager::can_view(doc, user_id))
    }

    fn filter(documents: Vec<Document>, keep: impl Fn(&Document) -> bool) -> Vec<Document> {
        let mut matched: Vec<Document> = documents.into_iter().filter(|doc| keep(doc)).collect();
        matched.sort_by_key(|doc| doc.id);
        matched
    }
}
