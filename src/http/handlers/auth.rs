//! Registration, login and logout.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::domain::dto::{
    LoginRequest, MessageResponse, RegisterRequest, TokenResponse, UserOut,
};
use crate::http::error::ApiError;
use crate::http::extract::ApiJson;
use crate::http::server::AppState;

pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserOut>), ApiError> {
    let credentials = body.validated()?;
    let user = state.auth.register(&credentials)?;
    tracing::info!(user_id = user.id, "User registered");
    Ok((StatusCode::CREATED, Json(UserOut::from(&user))))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state.auth.authenticate(&body.email, &body.password)?;
    let token = state.auth.issue_token(&user)?;
    Ok(Json(token))
}

/// Stateless JWT: logout is handled on the client side.
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Logged out",
    })
}
