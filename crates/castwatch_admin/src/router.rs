//! Assembles the administrative Axum router.

use crate::health::health;
use crate::rating::rate_now_playing;
use crate::state::AdminState;
use crate::videos::{list_queue, list_videos};
use axum::Router;
use axum::routing::{get, post};
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Builds the router: composite health, rating intake, and read-only
/// video/queue listings, with request tracing and a request timeout
/// matching the teacher's `tower-http` usage.
pub fn create_router(state: AdminState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/rating", post(rate_now_playing))
        .route("/videos", get(list_videos))
        .route("/queue", get(list_queue))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(10)))
        .with_state(state)
}
