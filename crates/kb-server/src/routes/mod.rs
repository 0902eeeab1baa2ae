//! Route definitions for the HTTP API.

pub mod documents;
pub mod health;
pub mod share;

use axum::Router;

use crate::state::AppState;

/// Build the complete router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(documents::routes())
        .merge(share::routes())
        .with_state(state)
}
