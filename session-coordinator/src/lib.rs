pub mod config;
pub mod error;
pub mod handlers;
pub mod housekeeper;
pub mod model;
pub mod snapshot;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::model::AppState;

/// Builds the `/api/*` router against a shared [`AppState`]. Split out of
/// `main` so integration tests can drive the same routes over a real
/// `TcpListener` without re-running `main`'s one-time setup.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/host", post(handlers::host))
        .route("/api/join", post(handlers::join))
        .route("/api/reconnect", post(handlers::join))
        .route("/api/place_ships", post(handlers::place_ships))
        .route("/api/attack", post(handlers::attack))
        .route("/api/gamestate", get(handlers::gamestate))
        .route("/api/quick_match", post(handlers::quick_match))
        .route("/api/cancel_quick_match", post(handlers::cancel_quick_match))
        .route("/api/check_quick_match", post(handlers::check_quick_match))
        .route("/api/quick_matches", get(handlers::quick_matches))
        .route("/api/spectate", post(handlers::spectate))
        .with_state(state)
}
