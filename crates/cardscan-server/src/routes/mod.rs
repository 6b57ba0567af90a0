//! Route definitions for the REST API.

mod cards;
mod health;

use axum::{extract::DefaultBodyLimit, routing::get, Router};

use crate::state::AppState;

/// Largest accepted request body. Leaves room for an attached card photo.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Cards
        .route("/cards", get(cards::list_cards).post(cards::create_card))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        // Attach state
        .with_state(state)
}

pub use cards::*;
pub use health::*;
