//! `@username` mention extraction.
//!
//! A mention is `@` followed by one or more ASCII word characters
//! (`[A-Za-z0-9_]`), where the `@` is not itself preceded by one
//! (`bob@example.com` is not a mention of `example`). Usernames are resolved to user ids through an
//! optional [`UserDirectory`]; anything that does not resolve is dropped.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;

use crate::error::StorageResult;
use crate::types::UserId;

static MENTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9_])@([A-Za-z0-9_]+)").expect("valid mention regex")
});

/// Resolves usernames found in content to user ids.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Looks up `username`; `Ok(None)` when no such user exists.
    async fn resolve(&self, username: &str) -> StorageResult<Option<UserId>>;
}

/// A fixed username → id table.
#[derive(Debug, Clone, Default)]
pub struct StaticUserDirectory {
    users: HashMap<String, UserId>,
}

impl StaticUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user (builder pattern).
    pub fn with_user(mut self, username: impl Into<String>, id: impl Into<UserId>) -> Self {
        self.users.insert(username.into(), id.into());
        self
    }
}

#[async_trait]
impl UserDirectory for StaticUserDirectory {
    async fn resolve(&self, username: &str) -> StorageResult<Option<UserId>> {
        Ok(self.users.get(username).cloned())
    }
}

/// The distinct usernames mentioned in `content`.
pub fn mentioned_usernames(content: &str) -> BTreeSet<String> {
    MENTION_PATTERN
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Turns content into the set of mentioned user ids.
#[derive(Clone, Default)]
pub struct MentionExtractor {
    directory: Option<Arc<dyn UserDirectory>>,
}

impl MentionExtractor {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            directory: Some(directory),
        }
    }

    /// An extractor with no directory; every extraction is empty.
    pub fn disabled() -> Self {
        Self { directory: None }
    }

    /// Resolves every mention in `content`.
    ///
    /// Directory failures are logged and the name is treated as unresolved.
    pub async fn extract(&self, content: &str) -> BTreeSet<UserId> {
        let Some(directory) = &self.directory else {
            return BTreeSet::new();
        };

        let mut resolved = BTreeSet::new();
        for username in mentioned_usernames(content) {
            match directory.resolve(&username).await {
                Ok(Some(id)) => {
                    resolved.insert(id);
                }
                Ok(None) => {
                    tracing::debug!(username = %username, "Mention does not match a user");
                }
                Err(e) => {
                    tracing::warn!(
                        username = %username,
                        error = %e,
                        "User directory lookup failed"
                    );
                }
            }
        }
        resolved
    }
}

impl fmt::Debug for MentionExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MentionExtractor")
            .field("directory", &self.directory.is_some())
            .finish()
    }
}
