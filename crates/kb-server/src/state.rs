//! Application state shared across handlers.

use std::sync::Arc;

use kb_core::DocumentService;

use crate::config::ServerConfig;

/// Application state shared across all handlers.
///
/// This is cloneable and can be extracted in handlers using `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Document lifecycle service.
    documents: Arc<DocumentService>,
    /// Server configuration.
    config: Arc<ServerConfig>,
}

impl AppState {
    /// Create new application state.
    pub fn new(documents: DocumentService, config: ServerConfig) -> Self {
        Self {
            documents: Arc::new(documents),
            config: Arc::new(config),
        }
    }

    /// Get a reference to the document service.
    pub fn documents(&self) -> &DocumentService {
        &self.documents
    }

    /// Get a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
