//! The Video record: one row per resolved remote video.

use serde::{Deserialize, Serialize};

/// A user's rating of a video.
///
/// # Examples
///
/// ```
/// use castwatch_core::Rating;
///
/// assert_eq!(Rating::Like.score_delta(), 1);
/// assert_eq!(Rating::Dislike.score_delta(), -1);
/// assert_eq!(Rating::None.score_delta(), 0);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    /// No rating has been applied.
    None,
    /// The video was liked.
    Like,
    /// The video was disliked.
    Dislike,
}

impl Rating {
    /// The signed contribution this rating makes to `rating_score`.
    pub fn score_delta(self) -> i32 {
        match self {
            Rating::None => 0,
            Rating::Like => 1,
            Rating::Dislike => -1,
        }
    }
}

/// Where a video record originated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum Source {
    /// Resolved while live media was playing.
    #[display("ha_live")]
    HaLive,
    /// Backfilled by an import utility; `label` names the import batch.
    #[display("import_{}", label)]
    Import {
        /// Identifies which import produced the row.
        label: String,
    },
    /// Resolved by the queue's Search Pipeline.
    #[display("queue_search")]
    QueueSearch,
}

/// One resolved remote video, keyed by `yt_video_id`.
///
/// A row with `yt_video_id = None` and `pending_reason = Some("not_found")`
/// is the not-found cache sentinel rather than a resolved video; see
/// [`crate::hash::content_hash`] for the key it is indexed by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into, strip_option), build_fn(error = "castwatch_error::BuilderError"))]
pub struct Video {
    /// Remote platform identity; `None` only for not-found sentinel rows.
    #[builder(default)]
    pub yt_video_id: Option<String>,

    /// Title as reported by the home-automation source.
    pub ha_title: String,
    /// Artist as reported by the home-automation source.
    #[builder(default)]
    pub ha_artist: Option<String>,
    /// The media-player app that was playing this content.
    #[builder(default)]
    pub ha_app_name: Option<String>,
    /// Duration in seconds as reported by the home-automation source.
    #[builder(default)]
    pub ha_duration: Option<i32>,
    /// SHA-256 hex of the normalized `(artist, title, duration)` triple.
    pub ha_content_hash: String,

    /// Title as resolved from the remote platform.
    #[builder(default)]
    pub yt_title: Option<String>,
    /// Channel display name.
    #[builder(default)]
    pub yt_channel: Option<String>,
    /// Channel identifier.
    #[builder(default)]
    pub yt_channel_id: Option<String>,
    /// Description, truncated to 5000 chars.
    #[builder(default)]
    pub yt_description: Option<String>,
    /// Publish timestamp, UTC.
    #[builder(default)]
    pub yt_published_at: Option<chrono::NaiveDateTime>,
    /// Platform category id.
    #[builder(default)]
    pub yt_category_id: Option<String>,
    /// True if the remote platform flags this as a live broadcast.
    #[builder(default)]
    pub yt_live_broadcast: Option<bool>,
    /// Recording location, if the platform reports one.
    #[builder(default)]
    pub yt_location: Option<String>,
    /// Recording date, if the platform reports one.
    #[builder(default)]
    pub yt_recording_date: Option<chrono::NaiveDateTime>,
    /// Duration in seconds as resolved from the remote platform; must equal
    /// `ha_duration` or `ha_duration + 1` (the platform-offset rule).
    #[builder(default)]
    pub yt_duration: Option<i32>,
    /// Canonical watch URL.
    #[builder(default)]
    pub yt_url: Option<String>,

    /// Current rating state.
    #[builder(default)]
    pub rating: Rating,
    /// Running `(likes - dislikes)` counter.
    #[builder(default)]
    pub rating_score: i32,
    /// Number of times this content has been observed playing.
    #[builder(default)]
    pub play_count: i32,
    /// When this record was first created.
    pub date_added: chrono::NaiveDateTime,
    /// When this content was last observed playing.
    #[builder(default)]
    pub date_last_played: Option<chrono::NaiveDateTime>,
    /// Provenance of this record.
    #[builder(default = "Source::HaLive")]
    pub source: Source,

    /// Set only on not-found sentinel rows (`yt_video_id = None`).
    #[builder(default)]
    pub pending_reason: Option<String>,
    /// Timestamp of the last search attempt for this content hash, used to
    /// enforce the not-found cache TTL.
    #[builder(default)]
    pub last_attempt: Option<chrono::NaiveDateTime>,
}

impl Video {
    /// True iff the remote-reported duration satisfies the platform-offset
    /// rule against the home-automation duration (spec §3, property 5).
    pub fn duration_matches(&self) -> bool {
        match (self.ha_duration, self.yt_duration) {
            (Some(ha), Some(yt)) => yt == ha || yt == ha + 1,
            _ => true,
        }
    }

    /// True iff this row is the not-found cache sentinel.
    pub fn is_not_found_sentinel(&self) -> bool {
        self.yt_video_id.is_none() && self.pending_reason.as_deref() == Some("not_found")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_accepts_exact_and_plus_one() {
        let mut v = VideoBuilder::default()
            .ha_title("Yesterday")
            .ha_content_hash("abc")
            .date_added(chrono::NaiveDateTime::UNIX_EPOCH)
            .ha_duration(125)
            .build()
            .unwrap();
        v.yt_duration = Some(125);
        assert!(v.duration_matches());
        v.yt_duration = Some(126);
        assert!(v.duration_matches());
        v.yt_duration = Some(127);
        assert!(!v.duration_matches());
    }
}
