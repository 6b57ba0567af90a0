//! Card endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use cardscan_core::{CardRecord, NewCard};
use tracing::{debug, info};

use crate::error::ApiResult;
use crate::state::AppState;

/// Register a card.
/// POST /cards
///
/// Missing or blank fields are rejected with `400` before anything is stored.
pub async fn create_card(
    State(state): State<AppState>,
    payload: Result<Json<NewCard>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CardRecord>)> {
    let Json(card) = payload?;
    debug!(has_image = card.image_data.is_some(), "Card submission received");

    let record = state.store.create(card).await?;
    info!(id = %record.id, insurer = %record.insurer, "Card registered");

    Ok((StatusCode::CREATED, Json(record)))
}

/// List every card, newest first.
/// GET /cards
pub async fn list_cards(State(state): State<AppState>) -> ApiResult<Json<Vec<CardRecord>>> {
    let records = state.store.list().await?;
    debug!(count = records.len(), "Cards listed");
    Ok(Json(records))
}
