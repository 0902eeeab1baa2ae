//! kb-store: PostgreSQL storage for the knowledge base
//!
//! This crate provides:
//! - Tables for documents, their version history and sharing grants
//! - A `users` table backing `@mention` resolution
//! - Migration management
//! - A [`Repository`] implementing the kb-core storage and directory traits
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use kb_core::DocumentService;
//! use kb_store::{Repository, Store, StoreConfig};
//!
//! let config = StoreConfig::from_env()?;
//! let repository = Arc::new(Repository::new(Store::connect(config).await?));
//!
//! let service = DocumentService::new(repository.clone())
//!     .with_user_directory(repository);
//! ```

pub mod error;
pub mod models;
pub mod repository;
pub mod schema;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use models::*;
pub use repository::Repository;
pub use store::{Store, StoreConfig, WriteOutcome};

// Re-export kb-core for downstream crates
pub use kb_core;
