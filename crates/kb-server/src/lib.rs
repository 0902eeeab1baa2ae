//! kb-server: HTTP API server for the knowledge base
//!
//! This crate provides:
//! - REST endpoints for documents, their history, sharing and search
//! - Requester identity from the `X-User-Id` header
//! - JSON error responses
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Request tracing and logging
//! - CORS handling
//! - Request ID generation
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use kb_core::{DocumentService, InMemoryStorage};
//! use kb_server::{AppState, ServerConfig, routes::build_router};
//!
//! let service = DocumentService::new(Arc::new(InMemoryStorage::new()));
//! let app = build_router(AppState::new(service, ServerConfig::from_env()?));
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod state;

// Re-exports for convenience
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

// Re-export dependent crates
pub use kb_core;
pub use kb_store;
