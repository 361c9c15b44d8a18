//! Read-only video and queue listing endpoints.

use crate::state::AdminState;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use castwatch_core::{QueueItem, QueueStatus, Video};
use serde::Deserialize;

const DEFAULT_LIMIT: i64 = 50;

/// `GET /videos`: the most recently active resolved videos.
pub async fn list_videos(State(state): State<AdminState>) -> (StatusCode, Json<Vec<Video>>) {
    match state.store.recent_videos(DEFAULT_LIMIT).await {
        Ok(videos) => (StatusCode::OK, Json(videos)),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, Json(Vec::new())),
    }
}

/// Query string for `GET /queue`.
#[derive(Debug, Deserialize)]
pub struct QueueQuery {
    /// Lifecycle state to filter by.
    status: QueueStatusParam,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum QueueStatusParam {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl From<QueueStatusParam> for QueueStatus {
    fn from(value: QueueStatusParam) -> Self {
        match value {
            QueueStatusParam::Pending => QueueStatus::Pending,
            QueueStatusParam::Processing => QueueStatus::Processing,
            QueueStatusParam::Completed => QueueStatus::Completed,
            QueueStatusParam::Failed => QueueStatus::Failed,
        }
    }
}

/// `GET /queue?status=pending`: queue items in a given lifecycle state.
pub async fn list_queue(
    State(state): State<AdminState>,
    Query(query): Query<QueueQuery>,
) -> (StatusCode, Json<Vec<QueueItem>>) {
    match state
        .store
        .list_by_status(query.status.into(), DEFAULT_LIMIT)
        .await
    {
        Ok(items) => (StatusCode::OK, Json(items)),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, Json(Vec::new())),
    }
}
