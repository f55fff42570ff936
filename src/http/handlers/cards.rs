//! Card endpoints, including the scored-card call to the upstream gateway.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::auth::CurrentUser;
use crate::cards;
use crate::domain::dto::{
    CardCreate, CardListQuery, CardMove, CardOut, CardUpdate, ScoreRequest, ScoreResponse,
};
use crate::http::error::ApiError;
use crate::http::extract::ApiJson;
use crate::http::server::AppState;
use crate::scoring::ScorePayload;

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<CardCreate>,
) -> Result<(StatusCode, Json<CardOut>), ApiError> {
    let new = body.validated()?;
    let card = cards::create_card(&state.store, &user, new)?;
    Ok((StatusCode::CREATED, Json(CardOut::from(&card))))
}

pub async fn get(
    State(state): State<AppState>,
    Path(card_id): Path<i64>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<CardOut>, ApiError> {
    let card = cards::get_card(&state.store, card_id, &user)?;
    Ok(Json(CardOut::from(&card)))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<CardListQuery>,
    CurrentUser(user): CurrentUser,
) -> Json<Vec<CardOut>> {
    let cards = cards::list_cards(&state.store, &user, &query);
    Json(cards.iter().map(CardOut::from).collect())
}

pub async fn update(
    State(state): State<AppState>,
    Path(card_id): Path<i64>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<CardUpdate>,
) -> Result<Json<CardOut>, ApiError> {
    let patch = body.validated()?;
    let card = cards::update_card(&state.store, card_id, &user, patch)?;
    Ok(Json(CardOut::from(&card)))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(card_id): Path<i64>,
    CurrentUser(user): CurrentUser,
) -> Result<StatusCode, ApiError> {
    cards::delete_card(&state.store, card_id, &user)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn move_card(
    State(state): State<AppState>,
    Path(card_id): Path<i64>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<CardMove>,
) -> Result<Json<CardOut>, ApiError> {
    let card = cards::update_card(&state.store, card_id, &user, body.into_patch())?;
    Ok(Json(CardOut::from(&card)))
}

/// Score a card through the shared upstream gateway.
pub async fn score(
    State(state): State<AppState>,
    Path(card_id): Path<i64>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<ScoreRequest>,
) -> Result<Json<ScoreResponse>, ApiError> {
    let context = body.validated()?;
    let card = cards::get_card(&state.store, card_id, &user)?;
    let payload = ScorePayload::from_card(&card, context);
    let score = state.scoring.fetch_score(&payload).await?;
    Ok(Json(ScoreResponse { score }))
}
