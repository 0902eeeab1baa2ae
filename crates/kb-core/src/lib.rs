//! kb-core: versioned documents for the knowledge base
//!
//! This crate provides:
//! - Document, version and permission types
//! - Append-only version history ([`VersionStore`])
//! - Sharing ACL and effective access ([`PermissionManager`])
//! - Substring search and filtered listings ([`SearchIndex`])
//! - `@username` mention extraction ([`MentionExtractor`])
//! - The [`DocumentService`] that ties them together over a [`DocumentStorage`]
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use kb_core::{DocumentService, InMemoryStorage, UserId};
//!
//! let service = DocumentService::new(Arc::new(InMemoryStorage::new()));
//! let author = UserId::from("u1");
//!
//! let doc = service.create("A", "Hello", false, &author).await?;
//! let doc = service.update(doc.id(), "A", "World", Some("edit1"), &author).await?;
//! assert_eq!(doc.versions().len(), 2);
//! ```

pub mod clock;
pub mod error;
pub mod memory;
pub mod mentions;
pub mod permissions;
pub mod search;
pub mod service;
pub mod storage;
pub mod types;
pub mod versions;

pub use clock::{Clock, IdSource, RandomIds, SequentialIds, StepClock, SystemClock};
pub use error::{DocumentError, DocumentResult, StorageError, StorageResult};
pub use memory::InMemoryStorage;
pub use mentions::{MentionExtractor, StaticUserDirectory, UserDirectory, mentioned_usernames};
pub use permissions::PermissionManager;
pub use search::SearchIndex;
pub use service::{DocumentService, MAX_WRITE_ATTEMPTS};
pub use storage::DocumentStorage;
pub use types::*;
pub use versions::{DEFAULT_CHANGE_DESCRIPTION, INITIAL_CHANGE_DESCRIPTION, VersionStore};
