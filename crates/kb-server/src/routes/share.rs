//! Share routes.
//!
//! - POST /documents/{id}/share - Grant access to a user
//! - DELETE /documents/{id}/share/{user_id} - Revoke access
//! - PUT /documents/{id}/visibility - Make a document public or private

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, post, put},
};
use kb_core::{AccessLevel, Document, DocumentId, UserId};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extract::Requester;
use crate::state::AppState;

/// Request body for granting access to a document.
#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    /// The user to grant access to.
    pub user_id: UserId,
    /// `"view"` or `"edit"`.
    pub level: AccessLevel,
}

/// Request body for changing visibility.
#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    pub is_public: bool,
}

/// POST /documents/{id}/share - Grant access to a document.
///
/// Only the author can share. Sharing again with the same user replaces
/// the earlier grant.
///
/// # Request
///
/// Body: `{ "user_id": "u2", "level": "view" }`
///
/// # Response
///
/// - 200 OK: the document with its updated sharing list
/// - 400 Bad Request: Blank user id, the author, or an unknown level
/// - 403 Forbidden: Requester is not the author
/// - 404 Not Found: Document not found
async fn share_document(
    State(state): State<AppState>,
    Requester(owner_id): Requester,
    Path(id): Path<DocumentId>,
    Json(request): Json<ShareRequest>,
) -> ApiResult<Json<Document>> {
    let document = state
        .documents()
        .share(id, &owner_id, &request.user_id, request.level)
        .await?;

    Ok(Json(document))
}

/// DELETE /documents/{id}/share/{user_id} - Revoke access.
///
/// Revoking a user with no grant succeeds without changing anything.
///
/// # Response
///
/// - 200 OK: the document with its updated sharing list
/// - 403 Forbidden: Requester is not the author
/// - 404 Not Found: Document not found
async fn revoke_access(
    State(state): State<AppState>,
    Requester(owner_id): Requester,
    Path((id, user_id)): Path<(DocumentId, String)>,
) -> ApiResult<Json<Document>> {
    let document = state
        .documents()
        .revoke(id, &owner_id, &UserId::from(user_id))
        .await?;

    Ok(Json(document))
}

/// PUT /documents/{id}/visibility - Make a document public or private.
///
/// # Request
///
/// Body: `{ "is_public": true }`
///
/// # Response
///
/// - 200 OK: the updated document
/// - 403 Forbidden: Requester is not the author
/// - 404 Not Found: Document not found
async fn set_visibility(
    State(state): State<AppState>,
    Requester(owner_id): Requester,
    Path(id): Path<DocumentId>,
    Json(request): Json<VisibilityRequest>,
) -> ApiResult<Json<Document>> {
    let document = state
        .documents()
        .set_visibility(id, &owner_id, request.is_public)
        .await?;

    Ok(Json(document))
}

/// Build share routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/documents/{id}/share", post(share_document))
        .route("/documents/{id}/share/{user_id}", delete(revoke_access))
        .route("/documents/{id}/visibility", put(set_visibility))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::testing::{app, create, send};

    #[tokio::test]
    async fn share_then_revoke() {
        let app = app();
        let id = create(&app, "u1", "A", "Hello", false).await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("/documents/{id}/share"),
            Some("u1"),
            Some(json!({ "user_id": "u2", "level": "edit" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["shared_with"][0]["user_id"], "u2");
        assert_eq!(body["shared_with"][0]["level"], "edit");
        assert_eq!(body["versions"].as_array().unwrap().len(), 1);

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/documents/{id}"),
            Some("u2"),
            Some(json!({ "title": "A", "content": "edited by u2" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            "DELETE",
            &format!("/documents/{id}/share/u2"),
            Some("u1"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["shared_with"].as_array().unwrap().is_empty());

        let (status, _) = send(&app, "GET", &format!("/documents/{id}"), Some("u2"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn only_author_shares() {
        let app = app();
        let id = create(&app, "u1", "A", "Hello", true).await;

        let (status, _) = send(
            &app,
            "POST",
            &format!("/documents/{id}/share"),
            Some("u2"),
            Some(json!({ "user_id": "u3", "level": "view" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app,
            "POST",
            &format!("/documents/{id}/share"),
            Some("u1"),
            Some(json!({ "user_id": "u1", "level": "view" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn blank_grantee_is_rejected() {
        let app = app();
        let id = create(&app, "u1", "A", "Hello", false).await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("/documents/{id}/share"),
            Some("u1"),
            Some(json!({ "user_id": "", "level": "view" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unknown_level_is_rejected() {
        let app = app();
        let id = create(&app, "u1", "A", "Hello", false).await;

        let (status, _) = send(
            &app,
            "POST",
            &format!("/documents/{id}/share"),
            Some("u1"),
            Some(json!({ "user_id": "u2", "level": "owner" })),
        )
        .await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn visibility_toggle() {
        let app = app();
        let id = create(&app, "u1", "A", "Hello", false).await;

        let (status, body) = send(
            &app,
            "PUT",
            &format!("/documents/{id}/visibility"),
            Some("u1"),
            Some(json!({ "is_public": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_public"], true);

        let (status, _) = send(&app, "GET", &format!("/documents/{id}"), Some("u9"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/documents/{id}/visibility"),
            Some("u9"),
            Some(json!({ "is_public": false })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
