//! Sharing ACL and effective access resolution.
//!
//! Precedence when resolving a user's access to a document:
//!
//! 1. the author always has [`AccessLevel::Edit`];
//! 2. otherwise an explicit grant decides;
//! 3. otherwise a public document gives [`AccessLevel::View`];
//! 4. otherwise there is no access.

use chrono::{DateTime, Utc};

use crate::types::{AccessLevel, Document, Permission, UserId};

/// Reads and edits the sharing list of a document.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionManager;

impl PermissionManager {
    /// Grants `level` to `user_id`, replacing any earlier grant for that user.
    pub fn grant(document: &mut Document, user_id: UserId, level: AccessLevel, now: DateTime<Utc>) {
        let permission = Permission {
            user_id,
            level,
            granted_at: now,
        };

        match document
            .shared_with
            .iter_mut()
            .find(|p| p.user_id == permission.user_id)
        {
            Some(existing) => *existing = permission,
            None => document.shared_with.push(permission),
        }
    }

    /// Removes the grant for `user_id`. Returns whether one existed.
    pub fn revoke(document: &mut Document, user_id: &UserId) -> bool {
        let before = document.shared_with.len();
        document.shared_with.retain(|p| &p.user_id != user_id);
        document.shared_with.len() != before
    }

    /// The access `user_id` holds on `document`, or `None` for no access.
    pub fn effective_level(document: &Document, user_id: &UserId) -> Option<AccessLevel> {
        if Self::is_owner(document, user_id) {
            return Some(AccessLevel::Edit);
        }

        if let Some(grant) = document.shared_with.iter().find(|p| &p.user_id == user_id) {
            return Some(grant.level);
        }

        document.is_public.then_some(AccessLevel::View)
    }

    /// Whether `user_id` authored the document.
    pub fn is_owner(document: &Document, user_id: &UserId) -> bool {
        &document.author_id == user_id
    }

    pub fn can_view(document: &Document, user_id: &UserId) -> bool {
        Self::effective_level(document, user_id).is_some()
    }

    pub fn can_edit(document: &Document, user_id: &UserId) -> bool {
        Self::effective_level(document, user_id) == Some(AccessLevel::Edit)
    }
}
