//! Document routes.
//!
//! - GET /documents - Documents the requester can view
//! - POST /documents - Create a document
//! - GET /documents/public - Public documents
//! - GET /documents/search?q= - Substring search
//! - GET /authors/{author_id}/documents - Documents by one author
//! - GET|PUT|DELETE /documents/{id} - Read, update, delete
//! - GET /documents/{id}/versions - Version history
//! - GET /documents/{id}/versions/{version_id} - One version

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use kb_core::{Document, DocumentId, PermissionManager, UserId, Version, VersionId};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::extract::Requester;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a document.
#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub title: String,
    pub content: String,
    /// Defaults to private.
    #[serde(default)]
    pub is_public: bool,
}

/// Request body for updating a document.
#[derive(Debug, Deserialize)]
pub struct UpdateDocumentRequest {
    pub title: String,
    pub content: String,
    /// Note recorded on the new version; "Document updated" when omitted.
    #[serde(default)]
    pub change_description: Option<String>,
}

/// Query parameters for search.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Response for a deleted document.
#[derive(Debug, Serialize)]
pub struct DeleteDocumentResponse {
    pub id: DocumentId,
    pub message: String,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /documents - Documents the requester can view.
///
/// # Response
///
/// - 200 OK: public, authored and shared-with-requester documents
/// - 401 Unauthorized: No `X-User-Id` header
async fn list_accessible(
    State(state): State<AppState>,
    Requester(user_id): Requester,
) -> ApiResult<Json<Vec<Document>>> {
    Ok(Json(state.documents().list_accessible(&user_id).await?))
}

/// POST /documents - Create a new document.
///
/// # Request
///
/// Body: `{ "title": "...", "content": "...", "is_public": false }`
///
/// # Response
///
/// - 201 Created: the document with its initial version
/// - 400 Bad Request: Blank title or content
/// - 401 Unauthorized: No `X-User-Id` header
async fn create_document(
    State(state): State<AppState>,
    Requester(user_id): Requester,
    Json(request): Json<CreateDocumentRequest>,
) -> ApiResult<(StatusCode, Json<Document>)> {
    let document = state
        .documents()
        .create(&request.title, &request.content, request.is_public, &user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(document)))
}

/// GET /documents/public - Every public document.
async fn list_public(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    Ok(Json(state.documents().list_public().await?))
}

/// GET /documents/search?q= - Case-insensitive search over titles and contents.
///
/// Anonymous callers search public documents only; identified callers also
/// search their own private documents. A blank query returns nothing.
async fn search_documents(
    State(state): State<AppState>,
    requester: Option<Requester>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Document>>> {
    let requester = requester.map(|Requester(user_id)| user_id);
    let results = state
        .documents()
        .search(&query.q, requester.as_ref())
        .await?;

    tracing::debug!(query = %query.q, results = results.len(), "Search completed");
    Ok(Json(results))
}

/// GET /authors/{author_id}/documents - Documents created by one author.
///
/// Only documents the requester may view are listed.
async fn list_by_author(
    State(state): State<AppState>,
    requester: Option<Requester>,
    Path(author_id): Path<String>,
) -> ApiResult<Json<Vec<Document>>> {
    let documents = state
        .documents()
        .list_by_author(&UserId::from(author_id))
        .await?;

    let visible = documents
        .into_iter()
        .filter(|doc| match &requester {
            Some(Requester(user_id)) => PermissionManager::can_view(doc, user_id),
            None => doc.is_public(),
        })
        .collect();

    Ok(Json(visible))
}

/// GET /documents/{id} - Fetch a document.
///
/// # Response
///
/// - 200 OK: the document with its full history
/// - 401 Unauthorized: No `X-User-Id` header
/// - 403 Forbidden: Requester has no access
/// - 404 Not Found: Document doesn't exist
async fn get_document(
    State(state): State<AppState>,
    Requester(user_id): Requester,
    Path(id): Path<DocumentId>,
) -> ApiResult<Json<Document>> {
    Ok(Json(state.documents().get(id, &user_id).await?))
}

/// PUT /documents/{id} - Update a document, appending a version.
///
/// # Request
///
/// Body: `{ "title": "...", "content": "...", "change_description": "..." }`
///
/// # Response
///
/// - 200 OK: the updated document
/// - 400 Bad Request: Blank title or content
/// - 403 Forbidden: Requester lacks edit access
/// - 404 Not Found: Document doesn't exist
/// - 409 Conflict: Too many concurrent writers
async fn update_document(
    State(state): State<AppState>,
    Requester(user_id): Requester,
    Path(id): Path<DocumentId>,
    Json(request): Json<UpdateDocumentRequest>,
) -> ApiResult<Json<Document>> {
    let document = state
        .documents()
        .update(
            id,
            &request.title,
            &request.content,
            request.change_description.as_deref(),
            &user_id,
        )
        .await?;

    Ok(Json(document))
}

/// DELETE /documents/{id} - Delete a document with its history.
///
/// # Response
///
/// - 200 OK: `{ "id": "...", "message": "Document deleted" }`
/// - 403 Forbidden: Not the author
/// - 404 Not Found: Document doesn't exist
async fn delete_document(
    State(state): State<AppState>,
    Requester(user_id): Requester,
    Path(id): Path<DocumentId>,
) -> ApiResult<Json<DeleteDocumentResponse>> {
    state.documents().delete(id, &user_id).await?;

    Ok(Json(DeleteDocumentResponse {
        id,
        message: "Document deleted".to_string(),
    }))
}

/// GET /documents/{id}/versions - Version history, oldest first.
async fn list_versions(
    State(state): State<AppState>,
    Requester(user_id): Requester,
    Path(id): Path<DocumentId>,
) -> ApiResult<Json<Vec<Version>>> {
    Ok(Json(state.documents().history(id, &user_id).await?))
}

/// GET /documents/{id}/versions/{version_id} - One version.
///
/// # Response
///
/// - 200 OK: the version
/// - 404 Not Found: No such document, or no such version in it
async fn get_version(
    State(state): State<AppState>,
    Requester(user_id): Requester,
    Path((id, version_id)): Path<(DocumentId, VersionId)>,
) -> ApiResult<Json<Version>> {
    Ok(Json(state.documents().version(id, version_id, &user_id).await?))
}

/// Build document routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/documents", get(list_accessible).post(create_document))
        .route("/documents/public", get(list_public))
        .route("/documents/search", get(search_documents))
        .route("/authors/{author_id}/documents", get(list_by_author))
        .route(
            "/documents/{id}",
            get(get_document).put(update_document).delete(delete_document),
        )
        .route("/documents/{id}/versions", get(list_versions))
        .route("/documents/{id}/versions/{version_id}", get(get_version))
}
