//! cardscan-server - REST API server for cardscan.
//!
//! Stores registered insurance cards and lists them back, newest first.
//!
//! # Example
//!
//! ```ignore
//! use cardscan_server::{create_server, AppState};
//!
//! #[tokio::main]
//! async fn main() {
//!     let state = AppState::from_config(&config.storage).unwrap();
//!     let app = create_server(state);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod error;
pub mod factory;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use factory::create_store;
pub use state::AppState;

use std::path::Path;

use axum::{middleware as axum_middleware, Router};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Create the server with all routes and middleware.
pub fn create_server(state: AppState) -> Router {
    with_layers(routes::create_router(state))
}

/// Create the server and serve the capture front-end from `static_dir` for
/// every path the API does not handle.
pub fn create_server_with_static(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    let static_dir = static_dir.as_ref();
    let files = ServeDir::new(static_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(static_dir.join("index.html")));

    with_layers(routes::create_router(state).fallback_service(files))
}

fn with_layers(router: Router) -> Router {
    router
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors_layer())
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
}
