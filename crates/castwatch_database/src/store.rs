//! The Store: durable persistence for videos, the work queue, the
//! search-result cache, and API usage accounting (spec §4.1).

use crate::models::{NewQueueItemRow, NewVideoRow, QueueItemRow, SearchCacheRow, VideoRow};
use crate::schema::{api_call_log, api_usage, queue_items, search_result_cache, videos};
use castwatch_core::hash::content_hash;
use castwatch_core::{Priority, QueueItem, QueuePayload, QueueStatus, Rating, Video};
use castwatch_error::{DatabaseError, DatabaseErrorKind};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument, warn};

/// Result type for Store operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// A cloneable handle to the embedded database. Cheap to clone: it wraps
/// an r2d2 pool, matching `botticelli_actor::state_persistence`'s pattern
/// for sharing pooled connections across async tasks.
#[derive(Debug, Clone)]
pub struct Store {
    pool: Pool<ConnectionManager<SqliteConnection>>,
}

impl Store {
    /// Opens (or creates) the embedded database at `database_path`.
    ///
    /// SQLite is single-writer; `max_size` is typically 1 in the Worker
    /// process and a small handful in the serving process for read
    /// concurrency (the `busy_timeout` pragma absorbs contention).
    pub fn new(database_path: &str, max_size: u32) -> DatabaseResult<Self> {
        let pool = crate::connection::build_pool(database_path, max_size)?;
        Ok(Self { pool })
    }

    fn conn(&self) -> DatabaseResult<diesel::r2d2::PooledConnection<ConnectionManager<SqliteConnection>>> {
        self.pool
            .get()
            .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))
    }

    /// Applies all pending migrations. Idempotent; safe to call on every
    /// startup before either the Worker or the Poller/Admin process
    /// touches the database.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> DatabaseResult<()> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> DatabaseResult<()> {
            let mut conn = pool
                .get()
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;
            conn.run_pending_migrations(MIGRATIONS)
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Migration(e.to_string())))?;
            info!("database migrations applied");
            Ok(())
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Migration(e.to_string())))?
    }

    /// Cheap liveness probe used by the admin surface's composite health
    /// endpoint.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> DatabaseResult<()> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> DatabaseResult<()> {
            let mut conn = pool
                .get()
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;
            diesel::sql_query("SELECT 1")
                .execute(&mut conn)
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?;
            Ok(())
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?
    }

    // ---- Video record ----------------------------------------------

    /// Inserts a resolved video, or on `yt_video_id` conflict overwrites
    /// platform-resolved fields while preserving `rating`, `rating_score`,
    /// `play_count`, and `date_added`.
    #[instrument(skip(self, video), fields(yt_video_id = ?video.yt_video_id))]
    pub async fn upsert_video(&self, video: Video) -> DatabaseResult<Video> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> DatabaseResult<Video> {
            let mut conn = pool
                .get()
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;

            let mut video = video;
            if video.ha_content_hash.is_empty() {
                video.ha_content_hash = content_hash(
                    video.ha_artist.as_deref(),
                    &video.ha_title,
                    video.ha_duration,
                );
            }

            conn.transaction::<Video, DatabaseError, _>(|conn| {
                let existing = video
                    .yt_video_id
                    .as_deref()
                    .map(|id| {
                        videos::table
                            .filter(videos::yt_video_id.eq(id))
                            .select(VideoRow::as_select())
                            .first::<VideoRow>(conn)
                            .optional()
                    })
                    .transpose()
                    .map_err(DatabaseError::from)?
                    .flatten();

                if let Some(existing) = existing {
                    diesel::update(videos::table.filter(videos::id.eq(existing.id)))
                        .set((
                            videos::ha_title.eq(&video.ha_title),
                            videos::ha_artist.eq(&video.ha_artist),
                            videos::ha_app_name.eq(&video.ha_app_name),
                            videos::ha_duration.eq(video.ha_duration),
                            videos::ha_content_hash.eq(&video.ha_content_hash),
                            videos::yt_title.eq(&video.yt_title),
                            videos::yt_channel.eq(&video.yt_channel),
                            videos::yt_channel_id.eq(&video.yt_channel_id),
                            videos::yt_description.eq(&video.yt_description),
                            videos::yt_published_at.eq(video.yt_published_at),
                            videos::yt_category_id.eq(&video.yt_category_id),
                            videos::yt_live_broadcast.eq(video.yt_live_broadcast),
                            videos::yt_location.eq(&video.yt_location),
                            videos::yt_recording_date.eq(video.yt_recording_date),
                            videos::yt_duration.eq(video.yt_duration),
                            videos::yt_url.eq(&video.yt_url),
                            videos::pending_reason.eq(&video.pending_reason),
                            videos::last_attempt.eq(video.last_attempt),
                        ))
                        .execute(conn)
                        .map_err(DatabaseError::from)?;

                    let row = videos::table
                        .filter(videos::id.eq(existing.id))
                        .select(VideoRow::as_select())
                        .first::<VideoRow>(conn)
                        .map_err(DatabaseError::from)?;
                    Video::try_from(row)
                } else {
                    let new_row = NewVideoRow::try_from(&video)?;
                    diesel::insert_into(videos::table)
                        .values(&new_row)
                        .execute(conn)
                        .map_err(DatabaseError::from)?;

                    let row = videos::table
                        .order(videos::id.desc())
                        .select(VideoRow::as_select())
                        .first::<VideoRow>(conn)
                        .map_err(DatabaseError::from)?;
                    Video::try_from(row)
                }
            })
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?
    }

    /// Atomically increments `play_count` and sets `date_last_played`. If
    /// `yt_video_id` is unknown, inserts a stub row with `play_count = 1`.
    #[instrument(skip(self))]
    pub async fn record_play(&self, yt_video_id: &str) -> DatabaseResult<()> {
        let pool = self.pool.clone();
        let yt_video_id = yt_video_id.to_string();
        tokio::task::spawn_blocking(move || -> DatabaseResult<()> {
            let mut conn = pool
                .get()
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;

            conn.transaction::<(), DatabaseError, _>(|conn| {
                let affected = diesel::update(
                    videos::table.filter(videos::yt_video_id.eq(&yt_video_id)),
                )
                .set((
                    videos::play_count.eq(videos::play_count + 1),
                    videos::date_last_played.eq(now()),
                ))
                .execute(conn)
                .map_err(DatabaseError::from)?;

                if affected == 0 {
                    let stub = NewVideoRow {
                        yt_video_id: Some(yt_video_id.clone()),
                        ha_title: yt_video_id.clone(),
                        ha_artist: None,
                        ha_app_name: None,
                        ha_duration: None,
                        ha_content_hash: content_hash(None, &yt_video_id, None),
                        yt_title: None,
                        yt_channel: None,
                        yt_channel_id: None,
                        yt_description: None,
                        yt_published_at: None,
                        yt_category_id: None,
                        yt_live_broadcast: None,
                        yt_location: None,
                        yt_recording_date: None,
                        yt_duration: None,
                        yt_url: None,
                        rating: "none".to_string(),
                        rating_score: 0,
                        play_count: 1,
                        date_added: now(),
                        date_last_played: Some(now()),
                        source: "ha_live".to_string(),
                        pending_reason: None,
                        last_attempt: None,
                    };
                    diesel::insert_into(videos::table)
                        .values(&stub)
                        .execute(conn)
                        .map_err(DatabaseError::from)?;
                }
                Ok(())
            })
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?
    }

    /// Transitions `rating` and adjusts `rating_score` by the signed
    /// delta, preserving the `(likes - dislikes)` invariant under
    /// repeated same-value ratings.
    #[instrument(skip(self))]
    pub async fn record_rating(&self, yt_video_id: &str, rating: Rating) -> DatabaseResult<()> {
        let pool = self.pool.clone();
        let yt_video_id = yt_video_id.to_string();
        tokio::task::spawn_blocking(move || -> DatabaseResult<()> {
            let mut conn = pool
                .get()
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;

            diesel::update(videos::table.filter(videos::yt_video_id.eq(&yt_video_id)))
                .set((
                    videos::rating.eq(rating.to_string().to_lowercase()),
                    videos::rating_score.eq(videos::rating_score + rating.score_delta()),
                ))
                .execute(&mut conn)
                .map_err(DatabaseError::from)?;
            Ok(())
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?
    }

    /// The current rating for a resolved video, if any row matches.
    #[instrument(skip(self))]
    pub async fn current_rating(&self, yt_video_id: &str) -> DatabaseResult<Option<Rating>> {
        let pool = self.pool.clone();
        let yt_video_id = yt_video_id.to_string();
        tokio::task::spawn_blocking(move || -> DatabaseResult<Option<Rating>> {
            let mut conn = pool
                .get()
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;

            let rating: Option<String> = videos::table
                .filter(videos::yt_video_id.eq(&yt_video_id))
                .select(videos::rating)
                .first(&mut conn)
                .optional()
                .map_err(DatabaseError::from)?;

            Ok(match rating.as_deref() {
                Some("like") => Some(Rating::Like),
                Some("dislike") => Some(Rating::Dislike),
                Some(_) => Some(Rating::None),
                None => None,
            })
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?
    }

    /// Combined cache lookup: prefers an exact content-hash match, falling
    /// back to `ha_title` with `ha_duration` matching either `ha_duration`
    /// or `yt_duration` (the platform-offset rule). Returns the most
    /// recently active matching record.
    #[instrument(skip(self))]
    pub async fn cache_lookup(
        &self,
        content_hash: &str,
        title: &str,
        duration: Option<i32>,
    ) -> DatabaseResult<Option<Video>> {
        let pool = self.pool.clone();
        let content_hash = content_hash.to_string();
        let title = title.to_string();
        tokio::task::spawn_blocking(move || -> DatabaseResult<Option<Video>> {
            let mut conn = pool
                .get()
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;

            let by_hash = videos::table
                .filter(videos::ha_content_hash.eq(&content_hash))
                .filter(videos::yt_video_id.is_not_null())
                .order(videos::date_last_played.desc().nulls_last())
                .select(VideoRow::as_select())
                .first::<VideoRow>(&mut conn)
                .optional()
                .map_err(DatabaseError::from)?;

            if let Some(row) = by_hash {
                return Ok(Some(Video::try_from(row)?));
            }

            let Some(duration) = duration else {
                return Ok(None);
            };

            let by_title = videos::table
                .filter(videos::ha_title.eq(&title))
                .filter(videos::yt_video_id.is_not_null())
                .filter(
                    videos::ha_duration
                        .eq(duration)
                        .or(videos::yt_duration.eq(duration))
                        .or(videos::yt_duration.eq(duration + 1)),
                )
                .order(videos::date_last_played.desc().nulls_last())
                .select(VideoRow::as_select())
                .first::<VideoRow>(&mut conn)
                .optional()
                .map_err(DatabaseError::from)?;

            by_title.map(Video::try_from).transpose()
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?
    }

    // ---- Search-result cache ----------------------------------------

    /// Inserts or replaces a batch of opportunistically fetched videos.
    #[instrument(skip(self, rows))]
    pub async fn cache_search_results(
        &self,
        rows: Vec<SearchCacheRow>,
    ) -> DatabaseResult<()> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> DatabaseResult<()> {
            let mut conn = pool
                .get()
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;
            for row in &rows {
                diesel::insert_into(search_result_cache::table)
                    .values(row)
                    .on_conflict(search_result_cache::yt_video_id)
                    .do_update()
                    .set(row)
                    .execute(&mut conn)
                    .map_err(DatabaseError::from)?;
            }
            debug!(count = rows.len(), "cached search results");
            Ok(())
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?
    }

    /// Queries cached, unexpired results by title substring and duration
    /// range `[duration - tolerance, duration + tolerance]`.
    #[instrument(skip(self))]
    pub async fn query_search_cache(
        &self,
        title_substring: &str,
        duration: i32,
        tolerance: i32,
    ) -> DatabaseResult<Vec<SearchCacheRow>> {
        let pool = self.pool.clone();
        let title_substring = format!("%{title_substring}%");
        tokio::task::spawn_blocking(move || -> DatabaseResult<Vec<SearchCacheRow>> {
            let mut conn = pool
                .get()
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;
            search_result_cache::table
                .filter(search_result_cache::yt_title.like(&title_substring))
                .filter(search_result_cache::yt_duration.ge(duration - tolerance))
                .filter(search_result_cache::yt_duration.le(duration + tolerance))
                .filter(search_result_cache::expires_at.gt(now()))
                .select(SearchCacheRow::as_select())
                .load(&mut conn)
                .map_err(|e| DatabaseError::from(e))
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?
    }

    /// Deletes expired search-result cache rows. Returns the number
    /// removed.
    #[instrument(skip(self))]
    pub async fn purge_expired_search_cache(&self) -> DatabaseResult<usize> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> DatabaseResult<usize> {
            let mut conn = pool
                .get()
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;
            let deleted = diesel::delete(
                search_result_cache::table.filter(search_result_cache::expires_at.le(now())),
            )
            .execute(&mut conn)
            .map_err(DatabaseError::from)?;
            info!(deleted, "purged expired search-result cache rows");
            Ok(deleted)
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?
    }

    // ---- Not-found cache ----------------------------------------------

    /// True iff a not-found sentinel row exists for `content_hash` whose
    /// `last_attempt` is within `ttl_hours`.
    #[instrument(skip(self))]
    pub async fn is_recently_not_found(
        &self,
        content_hash: &str,
        ttl_hours: i64,
    ) -> DatabaseResult<bool> {
        let pool = self.pool.clone();
        let content_hash = content_hash.to_string();
        tokio::task::spawn_blocking(move || -> DatabaseResult<bool> {
            let mut conn = pool
                .get()
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;
            let cutoff = now() - chrono::Duration::hours(ttl_hours);
            let exists: Option<i64> = videos::table
                .filter(videos::ha_content_hash.eq(&content_hash))
                .filter(videos::yt_video_id.is_null())
                .filter(videos::pending_reason.eq("not_found"))
                .filter(videos::last_attempt.gt(cutoff))
                .select(videos::id)
                .first(&mut conn)
                .optional()
                .map_err(DatabaseError::from)?;
            Ok(exists.is_some())
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?
    }

    /// Upserts a not-found sentinel row for `content_hash`.
    #[instrument(skip(self))]
    pub async fn record_not_found(
        &self,
        ha_title: &str,
        ha_artist: Option<&str>,
        ha_duration: Option<i32>,
        content_hash: &str,
    ) -> DatabaseResult<()> {
        let pool = self.pool.clone();
        let ha_title = ha_title.to_string();
        let ha_artist = ha_artist.map(str::to_string);
        let content_hash = content_hash.to_string();
        tokio::task::spawn_blocking(move || -> DatabaseResult<()> {
            let mut conn = pool
                .get()
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;

            let existing: Option<i64> = videos::table
                .filter(videos::ha_content_hash.eq(&content_hash))
                .filter(videos::yt_video_id.is_null())
                .filter(videos::pending_reason.eq("not_found"))
                .select(videos::id)
                .first(&mut conn)
                .optional()
                .map_err(DatabaseError::from)?;

            if let Some(id) = existing {
                diesel::update(videos::table.filter(videos::id.eq(id)))
                    .set(videos::last_attempt.eq(now()))
                    .execute(&mut conn)
                    .map_err(DatabaseError::from)?;
            } else {
                let stub = NewVideoRow {
                    yt_video_id: None,
                    ha_title,
                    ha_artist,
                    ha_app_name: None,
                    ha_duration,
                    ha_content_hash: content_hash,
                    yt_title: None,
                    yt_channel: None,
                    yt_channel_id: None,
                    yt_description: None,
                    yt_published_at: None,
                    yt_category_id: None,
                    yt_live_broadcast: None,
                    yt_location: None,
                    yt_recording_date: None,
                    yt_duration: None,
                    yt_url: None,
                    rating: "none".to_string(),
                    rating_score: 0,
                    play_count: 0,
                    date_added: now(),
                    date_last_played: None,
                    source: "queue_search".to_string(),
                    pending_reason: Some("not_found".to_string()),
                    last_attempt: Some(now()),
                };
                diesel::insert_into(videos::table)
                    .values(&stub)
                    .execute(&mut conn)
                    .map_err(DatabaseError::from)?;
            }
            Ok(())
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?
    }

    // ---- Queue ----------------------------------------------------------

    /// Enqueues a new item; priority is derived from the payload kind.
    #[instrument(skip(self, payload))]
    pub async fn enqueue(&self, payload: QueuePayload) -> DatabaseResult<QueueItem> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> DatabaseResult<QueueItem> {
            let mut conn = pool
                .get()
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;

            let priority = payload.priority();
            let serialized = serde_json::to_string(&payload).map_err(|e| {
                DatabaseError::new(DatabaseErrorKind::Query(format!(
                    "failed to serialize queue payload: {e}"
                )))
            })?;

            let new_row = NewQueueItemRow {
                priority: priority as i16,
                status: "pending".to_string(),
                payload: serialized,
                requested_at: now(),
            };

            diesel::insert_into(queue_items::table)
                .values(&new_row)
                .execute(&mut conn)
                .map_err(DatabaseError::from)?;

            let row = queue_items::table
                .order(queue_items::id.desc())
                .select(QueueItemRow::as_select())
                .first::<QueueItemRow>(&mut conn)
                .map_err(DatabaseError::from)?;

            info!(id = row.id, ?priority, "enqueued item");
            QueueItem::try_from(row)
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?
    }

    /// Atomically selects the oldest `pending` row of the lowest
    /// `priority`, marks it `processing`, bumps `attempts`, and stamps
    /// `last_attempt`.
    #[instrument(skip(self))]
    pub async fn claim_next(&self) -> DatabaseResult<Option<QueueItem>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> DatabaseResult<Option<QueueItem>> {
            let mut conn = pool
                .get()
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;

            conn.transaction::<Option<QueueItem>, DatabaseError, _>(|conn| {
                let candidate = queue_items::table
                    .filter(queue_items::status.eq("pending"))
                    .order((queue_items::priority.asc(), queue_items::id.asc()))
                    .select(QueueItemRow::as_select())
                    .first::<QueueItemRow>(conn)
                    .optional()
                    .map_err(DatabaseError::from)?;

                let Some(candidate) = candidate else {
                    return Ok(None);
                };

                diesel::update(queue_items::table.filter(queue_items::id.eq(candidate.id)))
                    .set((
                        queue_items::status.eq("processing"),
                        queue_items::attempts.eq(queue_items::attempts + 1),
                        queue_items::last_attempt.eq(now()),
                    ))
                    .execute(conn)
                    .map_err(DatabaseError::from)?;

                let row = queue_items::table
                    .filter(queue_items::id.eq(candidate.id))
                    .select(QueueItemRow::as_select())
                    .first::<QueueItemRow>(conn)
                    .map_err(DatabaseError::from)?;

                Ok(Some(QueueItem::try_from(row)?))
            })
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?
    }

    /// Marks a queue item completed.
    #[instrument(skip(self, trace))]
    pub async fn mark_completed(
        &self,
        id: i64,
        trace: Option<serde_json::Value>,
    ) -> DatabaseResult<()> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> DatabaseResult<()> {
            let mut conn = pool
                .get()
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;
            diesel::update(queue_items::table.filter(queue_items::id.eq(id)))
                .set((
                    queue_items::status.eq("completed"),
                    queue_items::completed_at.eq(now()),
                    queue_items::last_error.eq(Option::<String>::None),
                    queue_items::api_response_data.eq(trace.map(|v| v.to_string())),
                ))
                .execute(&mut conn)
                .map_err(DatabaseError::from)?;
            Ok(())
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?
    }

    /// Marks a queue item failed with `error`, preserving `trace` for
    /// diagnosis.
    #[instrument(skip(self, trace))]
    pub async fn mark_failed(
        &self,
        id: i64,
        error: &str,
        trace: Option<serde_json::Value>,
    ) -> DatabaseResult<()> {
        let pool = self.pool.clone();
        let error = error.to_string();
        tokio::task::spawn_blocking(move || -> DatabaseResult<()> {
            let mut conn = pool
                .get()
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;
            diesel::update(queue_items::table.filter(queue_items::id.eq(id)))
                .set((
                    queue_items::status.eq("failed"),
                    queue_items::completed_at.eq(now()),
                    queue_items::last_error.eq(&error),
                    queue_items::api_response_data.eq(trace.map(|v| v.to_string())),
                ))
                .execute(&mut conn)
                .map_err(DatabaseError::from)?;
            warn!(id, error, "queue item failed");
            Ok(())
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?
    }

    /// Flips every `processing` row back to `pending`. Called once at
    /// Worker startup, after the PID lock is acquired, to recover from a
    /// crash mid-item.
    #[instrument(skip(self))]
    pub async fn reset_stale_processing(&self) -> DatabaseResult<usize> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> DatabaseResult<usize> {
            let mut conn = pool
                .get()
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;
            let affected = diesel::update(
                queue_items::table.filter(queue_items::status.eq("processing")),
            )
            .set(queue_items::status.eq("pending"))
            .execute(&mut conn)
            .map_err(DatabaseError::from)?;
            if affected > 0 {
                warn!(affected, "reset stale processing rows after restart");
            }
            Ok(affected)
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?
    }

    /// Lists the most recently requested items in `status`, for
    /// observability.
    #[instrument(skip(self))]
    pub async fn list_by_status(
        &self,
        status: QueueStatus,
        limit: i64,
    ) -> DatabaseResult<Vec<QueueItem>> {
        let pool = self.pool.clone();
        let status_str = status.to_string().to_lowercase();
        tokio::task::spawn_blocking(move || -> DatabaseResult<Vec<QueueItem>> {
            let mut conn = pool
                .get()
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;
            let rows = queue_items::table
                .filter(queue_items::status.eq(status_str))
                .order(queue_items::requested_at.desc())
                .limit(limit)
                .select(QueueItemRow::as_select())
                .load::<QueueItemRow>(&mut conn)
                .map_err(DatabaseError::from)?;
            rows.into_iter().map(QueueItem::try_from).collect()
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?
    }

    /// The most recently active resolved videos, for read-only listing.
    #[instrument(skip(self))]
    pub async fn recent_videos(&self, limit: i64) -> DatabaseResult<Vec<Video>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> DatabaseResult<Vec<Video>> {
            let mut conn = pool
                .get()
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;
            let rows = videos::table
                .filter(videos::yt_video_id.is_not_null())
                .order(videos::date_last_played.desc().nulls_last())
                .limit(limit)
                .select(VideoRow::as_select())
                .load::<VideoRow>(&mut conn)
                .map_err(DatabaseError::from)?;
            rows.into_iter().map(Video::try_from).collect()
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?
    }

    // ---- API usage --------------------------------------------------

    /// Increments the current day's hour bucket and appends a call-log
    /// row, used by the Quota Calendar to answer "was quota exhausted
    /// since the last reset?".
    #[instrument(skip(self))]
    pub async fn record_api_call(
        &self,
        method: &str,
        success: bool,
        quota_cost: i32,
        error: Option<&str>,
    ) -> DatabaseResult<()> {
        let pool = self.pool.clone();
        let method = method.to_string();
        let error = error.map(str::to_string);
        tokio::task::spawn_blocking(move || -> DatabaseResult<()> {
            let mut conn = pool
                .get()
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;

            let today = Utc::now().format("%Y-%m-%d").to_string();
            let hour = Utc::now().format("%H").to_string();

            conn.transaction::<(), DatabaseError, _>(|conn| {
                diesel::sql_query(format!(
                    "INSERT INTO api_usage (day, hour_{hour}) VALUES (?1, 1) \
                     ON CONFLICT(day) DO UPDATE SET hour_{hour} = hour_{hour} + 1"
                ))
                .bind::<diesel::sql_types::Text, _>(&today)
                .execute(conn)
                .map_err(DatabaseError::from)?;

                diesel::insert_into(api_call_log::table)
                    .values((
                        api_call_log::method.eq(&method),
                        api_call_log::success.eq(success),
                        api_call_log::quota_cost.eq(quota_cost),
                        api_call_log::error_message.eq(&error),
                        api_call_log::called_at.eq(now()),
                    ))
                    .execute(conn)
                    .map_err(DatabaseError::from)?;
                Ok(())
            })
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?
    }

    /// The timestamp of the most recent failed call whose error message
    /// indicates quota exhaustion, if any since `since`.
    #[instrument(skip(self))]
    pub async fn most_recent_quota_failure_since(
        &self,
        since: NaiveDateTime,
    ) -> DatabaseResult<Option<NaiveDateTime>> {
        Ok(self
            .most_recent_quota_failure_detail_since(since)
            .await?
            .map(|(at, _)| at))
    }

    /// Same as [`Store::most_recent_quota_failure_since`], but also
    /// returns the call's error message, for recording a human-facing
    /// detail in the quota state file.
    #[instrument(skip(self))]
    pub async fn most_recent_quota_failure_detail_since(
        &self,
        since: NaiveDateTime,
    ) -> DatabaseResult<Option<(NaiveDateTime, Option<String>)>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> DatabaseResult<Option<(NaiveDateTime, Option<String>)>> {
            let mut conn = pool
                .get()
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;

            api_call_log::table
                .filter(api_call_log::success.eq(false))
                .filter(api_call_log::error_message.like("%quota%"))
                .filter(api_call_log::called_at.gt(since))
                .order(api_call_log::called_at.desc())
                .select((api_call_log::called_at, api_call_log::error_message))
                .first(&mut conn)
                .optional()
                .map_err(DatabaseError::from)
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?
    }
}
