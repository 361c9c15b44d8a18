//! Queue item types: the unified FIFO-within-priority work table.

use crate::Rating;
use serde::{Deserialize, Serialize};

/// Priority class. Lower values are claimed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(i16)]
pub enum Priority {
    /// Ratings always preempt searches.
    Rating = 1,
    /// Searches are claimed only once no rating is pending.
    Search = 2,
}

/// Lifecycle state of a queue row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    /// Waiting to be claimed.
    Pending,
    /// Claimed by the single Worker instance.
    Processing,
    /// Finished successfully.
    Completed,
    /// Finished unsuccessfully; does not auto-retry.
    Failed,
}

/// The payload carried by a `rating` queue item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingPayload {
    /// The resolved video to rate.
    pub yt_video_id: String,
    /// The rating to apply.
    pub rating: Rating,
}

/// The payload carried by a `search` queue item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into, strip_option), build_fn(error = "castwatch_error::BuilderError"))]
pub struct SearchPayload {
    /// Title as observed from the home-automation source.
    pub ha_title: String,
    /// Artist, if known.
    #[builder(default)]
    pub ha_artist: Option<String>,
    /// Album, if known.
    #[builder(default)]
    pub ha_album: Option<String>,
    /// The home-automation content identifier for the playing item.
    #[builder(default)]
    pub ha_content_id: Option<String>,
    /// Duration in seconds as observed.
    #[builder(default)]
    pub ha_duration: Option<i32>,
    /// The media-player app that was playing this content.
    #[builder(default)]
    pub ha_app_name: Option<String>,
    /// If set, a rating queue item is enqueued for the resolved video once
    /// this search completes successfully.
    #[builder(default)]
    pub callback_rating: Option<Rating>,
}

/// The typed payload of a queue item; the `type` discriminant spec.md
/// describes is this enum's tag rather than a separate column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::Display)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum QueuePayload {
    /// Apply a rating to an already-resolved video.
    #[display("rating")]
    Rating(RatingPayload),
    /// Resolve a video and, optionally, follow up with a rating.
    #[display("search")]
    Search(SearchPayload),
}

impl QueuePayload {
    /// The priority class implied by this payload's kind.
    pub fn priority(&self) -> Priority {
        match self {
            QueuePayload::Rating(_) => Priority::Rating,
            QueuePayload::Search(_) => Priority::Search,
        }
    }
}

/// One row in the durable work queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    /// Monotonic row id.
    pub id: i64,
    /// Priority class, implied by `payload` but stored for index-friendly
    /// `ORDER BY priority, id` claims.
    pub priority: Priority,
    /// Current lifecycle state.
    pub status: QueueStatus,
    /// Typed work payload.
    pub payload: QueuePayload,
    /// When this item was enqueued.
    pub requested_at: chrono::NaiveDateTime,
    /// When this item was last claimed.
    pub last_attempt: Option<chrono::NaiveDateTime>,
    /// When this item reached a terminal state.
    pub completed_at: Option<chrono::NaiveDateTime>,
    /// Number of times this item has been claimed.
    pub attempts: i32,
    /// Reason the item failed, if it did.
    pub last_error: Option<String>,
    /// Opaque trace of the remote response(s) involved, for diagnosis.
    pub api_response_data: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_outranks_search() {
        assert!(Priority::Rating < Priority::Search);
    }

    #[test]
    fn payload_priority_matches_kind() {
        let rating = QueuePayload::Rating(RatingPayload {
            yt_video_id: "abc".into(),
            rating: Rating::Like,
        });
        assert_eq!(rating.priority(), Priority::Rating);

        let search = QueuePayload::Search(
            SearchPayloadBuilder::default()
                .ha_title("Yesterday")
                .build()
                .unwrap(),
        );
        assert_eq!(search.priority(), Priority::Search);
    }
}
