//! Diesel row types and their mapping to/from `castwatch_core` domain types.

use crate::schema::{queue_items, search_result_cache, videos};
use castwatch_core::{Priority, QueueItem, QueuePayload, QueueStatus, Rating, Source, Video};
use castwatch_error::{DatabaseError, DatabaseErrorKind};
use chrono::NaiveDateTime;
use diesel::prelude::*;

/// Diesel-mapped row for the `videos` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = videos)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct VideoRow {
    pub id: i64,
    pub yt_video_id: Option<String>,
    pub ha_title: String,
    pub ha_artist: Option<String>,
    pub ha_app_name: Option<String>,
    pub ha_duration: Option<i32>,
    pub ha_content_hash: String,
    pub yt_title: Option<String>,
    pub yt_channel: Option<String>,
    pub yt_channel_id: Option<String>,
    pub yt_description: Option<String>,
    pub yt_published_at: Option<NaiveDateTime>,
    pub yt_category_id: Option<String>,
    pub yt_live_broadcast: Option<bool>,
    pub yt_location: Option<String>,
    pub yt_recording_date: Option<NaiveDateTime>,
    pub yt_duration: Option<i32>,
    pub yt_url: Option<String>,
    pub rating: String,
    pub rating_score: i32,
    pub play_count: i32,
    pub date_added: NaiveDateTime,
    pub date_last_played: Option<NaiveDateTime>,
    pub source: String,
    pub pending_reason: Option<String>,
    pub last_attempt: Option<NaiveDateTime>,
}

/// A new row to insert into `videos`; `id` is database-assigned.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = videos)]
pub struct NewVideoRow {
    pub yt_video_id: Option<String>,
    pub ha_title: String,
    pub ha_artist: Option<String>,
    pub ha_app_name: Option<String>,
    pub ha_duration: Option<i32>,
    pub ha_content_hash: String,
    pub yt_title: Option<String>,
    pub yt_channel: Option<String>,
    pub yt_channel_id: Option<String>,
    pub yt_description: Option<String>,
    pub yt_published_at: Option<NaiveDateTime>,
    pub yt_category_id: Option<String>,
    pub yt_live_broadcast: Option<bool>,
    pub yt_location: Option<String>,
    pub yt_recording_date: Option<NaiveDateTime>,
    pub yt_duration: Option<i32>,
    pub yt_url: Option<String>,
    pub rating: String,
    pub rating_score: i32,
    pub play_count: i32,
    pub date_added: NaiveDateTime,
    pub date_last_played: Option<NaiveDateTime>,
    pub source: String,
    pub pending_reason: Option<String>,
    pub last_attempt: Option<NaiveDateTime>,
}

impl TryFrom<&Video> for NewVideoRow {
    type Error = DatabaseError;

    fn try_from(v: &Video) -> Result<Self, Self::Error> {
        Ok(NewVideoRow {
            yt_video_id: v.yt_video_id.clone(),
            ha_title: v.ha_title.clone(),
            ha_artist: v.ha_artist.clone(),
            ha_app_name: v.ha_app_name.clone(),
            ha_duration: v.ha_duration,
            ha_content_hash: v.ha_content_hash.clone(),
            yt_title: v.yt_title.clone(),
            yt_channel: v.yt_channel.clone(),
            yt_channel_id: v.yt_channel_id.clone(),
            yt_description: v.yt_description.clone(),
            yt_published_at: v.yt_published_at,
            yt_category_id: v.yt_category_id.clone(),
            yt_live_broadcast: v.yt_live_broadcast,
            yt_location: v.yt_location.clone(),
            yt_recording_date: v.yt_recording_date,
            yt_duration: v.yt_duration,
            yt_url: v.yt_url.clone(),
            rating: v.rating.to_string().to_lowercase(),
            rating_score: v.rating_score,
            play_count: v.play_count,
            date_added: v.date_added,
            date_last_played: v.date_last_played,
            source: source_to_string(&v.source),
            pending_reason: v.pending_reason.clone(),
            last_attempt: v.last_attempt,
        })
    }
}

impl TryFrom<VideoRow> for Video {
    type Error = DatabaseError;

    fn try_from(row: VideoRow) -> Result<Self, Self::Error> {
        Ok(Video {
            yt_video_id: row.yt_video_id,
            ha_title: row.ha_title,
            ha_artist: row.ha_artist,
            ha_app_name: row.ha_app_name,
            ha_duration: row.ha_duration,
            ha_content_hash: row.ha_content_hash,
            yt_title: row.yt_title,
            yt_channel: row.yt_channel,
            yt_channel_id: row.yt_channel_id,
            yt_description: row.yt_description,
            yt_published_at: row.yt_published_at,
            yt_category_id: row.yt_category_id,
            yt_live_broadcast: row.yt_live_broadcast,
            yt_location: row.yt_location,
            yt_recording_date: row.yt_recording_date,
            yt_duration: row.yt_duration,
            yt_url: row.yt_url,
            rating: rating_from_string(&row.rating)?,
            rating_score: row.rating_score,
            play_count: row.play_count,
            date_added: row.date_added,
            date_last_played: row.date_last_played,
            source: source_from_string(&row.source),
            pending_reason: row.pending_reason,
            last_attempt: row.last_attempt,
        })
    }
}

fn rating_from_string(s: &str) -> Result<Rating, DatabaseError> {
    match s {
        "none" => Ok(Rating::None),
        "like" => Ok(Rating::Like),
        "dislike" => Ok(Rating::Dislike),
        other => Err(DatabaseError::new(DatabaseErrorKind::Query(format!(
            "unknown rating value in storage: {other}"
        )))),
    }
}

fn source_to_string(source: &Source) -> String {
    match source {
        Source::HaLive => "ha_live".to_string(),
        Source::Import { label } => format!("import_{label}"),
        Source::QueueSearch => "queue_search".to_string(),
    }
}

fn source_from_string(s: &str) -> Source {
    if let Some(label) = s.strip_prefix("import_") {
        Source::Import {
            label: label.to_string(),
        }
    } else if s == "queue_search" {
        Source::QueueSearch
    } else {
        Source::HaLive
    }
}

/// Diesel-mapped row for the `queue_items` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = queue_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct QueueItemRow {
    pub id: i64,
    pub priority: i16,
    pub status: String,
    pub payload: String,
    pub requested_at: NaiveDateTime,
    pub last_attempt: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub api_response_data: Option<String>,
}

/// A new row to insert into `queue_items`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = queue_items)]
pub struct NewQueueItemRow {
    pub priority: i16,
    pub status: String,
    pub payload: String,
    pub requested_at: NaiveDateTime,
}

impl TryFrom<QueueItemRow> for QueueItem {
    type Error = DatabaseError;

    fn try_from(row: QueueItemRow) -> Result<Self, Self::Error> {
        let payload: QueuePayload = serde_json::from_str(&row.payload).map_err(|e| {
            DatabaseError::new(DatabaseErrorKind::Query(format!(
                "corrupt queue payload for item {}: {e}",
                row.id
            )))
        })?;
        let status = match row.status.as_str() {
            "pending" => QueueStatus::Pending,
            "processing" => QueueStatus::Processing,
            "completed" => QueueStatus::Completed,
            "failed" => QueueStatus::Failed,
            other => {
                return Err(DatabaseError::new(DatabaseErrorKind::Query(format!(
                    "unknown queue status in storage: {other}"
                ))));
            }
        };
        let priority = match row.priority {
            1 => Priority::Rating,
            2 => Priority::Search,
            other => {
                return Err(DatabaseError::new(DatabaseErrorKind::Query(format!(
                    "unknown queue priority in storage: {other}"
                ))));
            }
        };
        let api_response_data = row
            .api_response_data
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(|e| {
                DatabaseError::new(DatabaseErrorKind::Query(format!(
                    "corrupt api_response_data for item {}: {e}",
                    row.id
                )))
            })?;

        Ok(QueueItem {
            id: row.id,
            priority,
            status,
            payload,
            requested_at: row.requested_at,
            last_attempt: row.last_attempt,
            completed_at: row.completed_at,
            attempts: row.attempts,
            last_error: row.last_error,
            api_response_data,
        })
    }
}

/// Diesel-mapped row for the `search_result_cache` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = search_result_cache)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SearchCacheRow {
    pub yt_video_id: String,
    pub yt_title: String,
    pub yt_channel: Option<String>,
    pub yt_channel_id: Option<String>,
    pub yt_duration: Option<i32>,
    pub yt_description: Option<String>,
    pub yt_category_id: Option<String>,
    pub expires_at: NaiveDateTime,
}
