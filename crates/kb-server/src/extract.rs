//! Requester identity extraction from the `X-User-Id` header.
//!
//! Identity is asserted by whatever sits in front of the server; no
//! credentials are checked here.

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use kb_core::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the acting user's id.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// The acting user. Rejects the request with 401 when the header is absent.
///
/// Use `Option<Requester>` in handlers that also serve anonymous callers.
#[derive(Debug, Clone)]
pub struct Requester(pub UserId);

impl FromRequestParts<AppState> for Requester {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        <Self as OptionalFromRequestParts<AppState>>::from_request_parts(parts, state)
            .await?
            .ok_or_else(|| ApiError::Unauthorized(format!("missing {USER_ID_HEADER} header")))
    }
}

impl OptionalFromRequestParts<AppState> for Requester {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        let Some(header_value) = parts.headers.get(USER_ID_HEADER) else {
            return Ok(None);
        };

        let user_id = header_value.to_str().map_err(|_| {
            ApiError::BadRequest(format!("{USER_ID_HEADER} header contains invalid characters"))
        })?;

        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(ApiError::BadRequest(format!(
                "{USER_ID_HEADER} header must not be empty"
            )));
        }

        tracing::debug!(user_id = %user_id, "Request identity from header");
        Ok(Some(Self(UserId::from(user_id))))
    }
}
