//! Request extractor for the authenticated user.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::domain::models::User;
use crate::http::error::ApiError;
use crate::http::server::AppState;

/// Extracts the user behind `Authorization: Bearer <token>`.
///
/// Rejections render through the uniform envelope as 401 `UNAUTHORIZED`.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

        let user = state.auth.resolve_bearer(token.trim())?;
        Ok(CurrentUser(user))
    }
}
