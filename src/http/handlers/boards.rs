//! Board endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::auth::CurrentUser;
use crate::boards;
use crate::domain::dto::{BoardCreate, BoardOut};
use crate::http::error::ApiError;
use crate::http::extract::ApiJson;
use crate::http::server::AppState;

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<BoardCreate>,
) -> Result<(StatusCode, Json<BoardOut>), ApiError> {
    let title = body.validated()?;
    let board = boards::create_board(&state.store, &user, title);
    Ok((StatusCode::CREATED, Json(BoardOut::from(&board))))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Json<Vec<BoardOut>> {
    let boards = boards::list_boards(&state.store, &user);
    Json(boards.iter().map(BoardOut::from).collect())
}
