//! `POST /rating`: the Rating Intake HTTP surface (spec §4.9).

use crate::state::AdminState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use castwatch_core::Rating;
use castwatch_error::RemoteErrorKind;
use castwatch_poller::RatingIntakeOutcome;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Request body: `{"rating": "like" | "dislike"}`.
#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    rating: Rating,
}

#[derive(Debug, Serialize)]
struct RatingResponse {
    accepted: bool,
    outcome: &'static str,
}

/// Accepts a like/dislike for whatever is currently playing. Never makes
/// a synchronous call against the remote video platform.
pub async fn rate_now_playing(
    State(state): State<AdminState>,
    Json(request): Json<RatingRequest>,
) -> (StatusCode, Json<RatingResponse>) {
    match state.rating_intake.rate_now_playing(request.rating).await {
        Ok(RatingIntakeOutcome::EnqueuedRating) => {
            info!(target: "rating", rating = ?request.rating, "rating request enqueued directly");
            (
                StatusCode::ACCEPTED,
                Json(RatingResponse {
                    accepted: true,
                    outcome: "enqueued_rating",
                }),
            )
        }
        Ok(RatingIntakeOutcome::EnqueuedSearch) => {
            info!(target: "rating", rating = ?request.rating, "rating request enqueued via search fallback");
            (
                StatusCode::ACCEPTED,
                Json(RatingResponse {
                    accepted: true,
                    outcome: "enqueued_search",
                }),
            )
        }
        Err(e) => {
            let status = match e.kind() {
                RemoteErrorKind::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            };
            (
                status,
                Json(RatingResponse {
                    accepted: false,
                    outcome: "rejected",
                }),
            )
        }
    }
}
