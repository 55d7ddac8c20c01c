//! Axum router construction for the Observer API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin renderer access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::control;
use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws/frames` -- `WebSocket` frame stream
/// - `GET /api/playback/status`, `/api/frame`, `/api/days`,
///   `/api/entities`, `/api/entities/{id}` -- snapshot reads
/// - `POST /api/playback/*`, `/api/hover/*` -- playback control
/// - `POST|DELETE /api/entities/{id}/highlight` -- subject emphasis
///
/// CORS is configured to allow any origin for development.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/frames", get(ws::ws_frames))
        // Snapshot reads
        .route("/api/playback/status", get(handlers::status))
        .route("/api/frame", get(handlers::get_frame))
        .route("/api/days", get(handlers::list_days))
        .route("/api/entities", get(handlers::list_entities))
        .route("/api/entities/{id}", get(handlers::get_entity))
        // Playback control
        .route("/api/playback/play", post(control::play))
        .route("/api/playback/pause", post(control::pause))
        .route("/api/playback/toggle", post(control::toggle))
        .route("/api/playback/reset", post(control::reset))
        .route("/api/playback/seek", post(control::seek))
        .route("/api/playback/jump", post(control::jump))
        .route("/api/playback/scrub/begin", post(control::begin_scrub))
        .route("/api/playback/scrub", post(control::scrub))
        .route("/api/playback/scrub/end", post(control::end_scrub))
        .route("/api/hover/enter", post(control::hover_enter))
        .route("/api/hover/leave", post(control::hover_leave))
        .route(
            "/api/entities/{id}/highlight",
            post(control::highlight).delete(control::clear_highlight),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
