//! The Worker process loop (spec §4.7): single-instance PID lock, crash
//! recovery, and the claim/dispatch/sleep cycle.
//!
//! The claim-dispatch-record loop is grounded on the teacher's closest
//! analogue, `botticelli_actor::Actor::execute`'s skill loop, generalized
//! from "run configured skills once" to "loop claiming queue items
//! forever".

use crate::api_accounting::record_outcome;
use crate::pid_lock::PidLock;
use crate::search_pipeline::{SearchPipeline, SearchPipelineConfig};
use castwatch_core::quota_calendar::{RESET_BUFFER_SECS, next_reset_utc};
use castwatch_core::{CastwatchConfig, QueuePayload, QuotaState, Rating, quota_state};
use castwatch_database::Store;
use castwatch_error::{RemoteErrorKind, WorkerError, WorkerErrorKind};
use castwatch_remote::{QUOTA_COST_SET_RATING, VideoPlatformClient};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::sync::Notify;
use tracing::{error, info, instrument, warn};

const ITEM_INTERVAL: StdDuration = StdDuration::from_secs(60);
const EMPTY_QUEUE_SLEEP: StdDuration = StdDuration::from_secs(60);
const SLEEP_CHUNK: StdDuration = StdDuration::from_secs(1);

/// Owns the Worker's dependencies and its shutdown signal.
pub struct Worker {
    store: Store,
    client: VideoPlatformClient,
    pipeline: SearchPipeline,
    config: CastwatchConfig,
    shutdown: Arc<Notify>,
}

impl Worker {
    /// Builds a worker. The remote client is constructed but performs no
    /// I/O until first used (spec §4.7 step 2).
    pub fn new(store: Store, client: VideoPlatformClient, config: CastwatchConfig) -> Self {
        let pipeline = SearchPipeline::new(
            client.clone(),
            store.clone(),
            SearchPipelineConfig {
                phase1_size: *config.search_phase1_size() as usize,
                phase2_size: *config.search_phase2_size() as usize,
                search_cache_ttl_days: *config.search_cache_ttl_days(),
            },
        );
        Self {
            store,
            client,
            pipeline,
            config,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// A handle that, when notified, requests graceful shutdown of
    /// [`Worker::run`].
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.shutdown)
    }

    /// Acquires the PID lock, resets stale processing rows, and runs the
    /// claim/dispatch loop until shutdown is requested. Returns the
    /// process exit code described in spec §6.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<i32, WorkerError> {
        let lock = PidLock::acquire(self.config.pid_file_path())?;
        let reset = self
            .store
            .reset_stale_processing()
            .await
            .map_err(|e| WorkerError::new(WorkerErrorKind::PidLockIo(e.to_string())))?;
        if reset > 0 {
            warn!(reset, "recovered stale processing rows after restart");
        }

        let exit_code = self.loop_until_shutdown().await;
        lock.release();
        Ok(exit_code)
    }

    async fn loop_until_shutdown(&self) -> i32 {
        loop {
            if self.interruptible_sleep(StdDuration::ZERO).await {
                return 0;
            }

            match self.quota_exhausted_since_last_reset().await {
                Ok(true) => {
                    let reset = next_reset_utc(Utc::now());
                    let sleep_for = (reset - Utc::now()).to_std().unwrap_or_default()
                        + StdDuration::from_secs(RESET_BUFFER_SECS as u64);
                    info!(?reset, "quota exhausted, sleeping until reset");
                    if self.interruptible_sleep(sleep_for).await {
                        return 0;
                    }
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    error!(error = %e, "failed to query quota calendar; proceeding cautiously");
                }
            }

            let claimed = match self.store.claim_next().await {
                Ok(Some(item)) => item,
                Ok(None) => {
                    if self.interruptible_sleep(EMPTY_QUEUE_SLEEP).await {
                        return 0;
                    }
                    continue;
                }
                Err(e) => {
                    error!(error = %e, "failed to claim next queue item");
                    if self.interruptible_sleep(EMPTY_QUEUE_SLEEP).await {
                        return 0;
                    }
                    continue;
                }
            };

            match self.dispatch(claimed.id, &claimed.payload).await {
                DispatchOutcome::Completed => {
                    if let Err(e) = self.store.mark_completed(claimed.id, None).await {
                        error!(error = %e, "failed to mark item completed");
                    }
                }
                DispatchOutcome::Failed(reason) => {
                    if let Err(e) = self.store.mark_failed(claimed.id, &reason, None).await {
                        error!(error = %e, "failed to mark item failed");
                    }
                }
                DispatchOutcome::QuotaExceeded => {
                    if let Err(e) = self.store.mark_failed(claimed.id, "quota", None).await {
                        error!(error = %e, "failed to mark item failed (quota)");
                    }
                    continue;
                }
                DispatchOutcome::AuthenticationFailed(reason) => {
                    error!(reason, "authentication failure, worker exiting");
                    let _ = self.store.mark_failed(claimed.id, &reason, None).await;
                    return 1;
                }
            }

            if self.interruptible_sleep(ITEM_INTERVAL).await {
                return 0;
            }
        }
    }

    async fn dispatch(&self, item_id: i64, payload: &QueuePayload) -> DispatchOutcome {
        match payload {
            QueuePayload::Rating(rating_payload) => {
                self.dispatch_rating(&rating_payload.yt_video_id, rating_payload.rating)
                    .await
            }
            QueuePayload::Search(search_payload) => {
                self.dispatch_search(item_id, search_payload).await
            }
        }
    }

    async fn dispatch_rating(&self, yt_video_id: &str, rating: Rating) -> DispatchOutcome {
        let current = self.store.current_rating(yt_video_id).await.ok().flatten();
        if current == Some(rating) {
            // Same-value re-rate: no remote call, but the delta still applies
            // (spec §4.7 step 4, §8 property 7).
            if let Err(e) = self.store.record_rating(yt_video_id, rating).await {
                return DispatchOutcome::Failed(e.to_string());
            }
            info!(target: "rating", yt_video_id, ?rating, "re-rate, no remote call");
            return DispatchOutcome::Completed;
        }

        let result = record_outcome(
            &self.store,
            "videos.rate",
            QUOTA_COST_SET_RATING,
            self.client.set_rating(yt_video_id, rating).await,
        )
        .await;

        match result {
            Ok(()) => match self.store.record_rating(yt_video_id, rating).await {
                Ok(()) => {
                    info!(target: "rating", yt_video_id, ?rating, "rating applied");
                    DispatchOutcome::Completed
                }
                Err(e) => DispatchOutcome::Failed(e.to_string()),
            },
            Err(e) => classify_remote_failure(e),
        }
    }

    async fn dispatch_search(
        &self,
        _item_id: i64,
        search_payload: &castwatch_core::SearchPayload,
    ) -> DispatchOutcome {
        let content_hash = castwatch_core::hash::content_hash(
            search_payload.ha_artist.as_deref(),
            &search_payload.ha_title,
            search_payload.ha_duration,
        );

        let cached = self
            .store
            .cache_lookup(&content_hash, &search_payload.ha_title, search_payload.ha_duration)
            .await
            .ok()
            .flatten();

        let resolved = if let Some(video) = cached {
            Some(video)
        } else {
            match self
                .pipeline
                .search(
                    &search_payload.ha_title,
                    search_payload.ha_artist.as_deref(),
                    search_payload.ha_duration,
                )
                .await
            {
                Ok(Some(candidate)) => Some(candidate.video),
                Ok(None) => None,
                Err(e) => return classify_remote_failure(e),
            }
        };

        let Some(mut video) = resolved else {
            if let Err(e) = self
                .store
                .record_not_found(
                    &search_payload.ha_title,
                    search_payload.ha_artist.as_deref(),
                    search_payload.ha_duration,
                    &content_hash,
                )
                .await
            {
                warn!(error = %e, "failed to record not-found entry");
            }
            return DispatchOutcome::Failed(WorkerErrorKind::NoMatchFound.to_string());
        };

        video.ha_title = search_payload.ha_title.clone();
        video.ha_artist = search_payload.ha_artist.clone();
        video.ha_app_name = search_payload.ha_app_name.clone();
        video.ha_duration = search_payload.ha_duration;
        video.ha_content_hash = content_hash;

        let upserted = match self.store.upsert_video(video).await {
            Ok(v) => v,
            Err(e) => return DispatchOutcome::Failed(e.to_string()),
        };

        if let Some(yt_video_id) = &upserted.yt_video_id {
            if let Err(e) = self.store.record_play(yt_video_id).await {
                warn!(error = %e, "failed to record play for resolved search");
            }

            if let Some(callback_rating) = search_payload.callback_rating {
                let enqueue_result = self
                    .store
                    .enqueue(QueuePayload::Rating(castwatch_core::RatingPayload {
                        yt_video_id: yt_video_id.clone(),
                        rating: callback_rating,
                    }))
                    .await;
                if let Err(e) = enqueue_result {
                    warn!(error = %e, "failed to enqueue callback rating");
                }
            }
        }

        DispatchOutcome::Completed
    }

    /// Queries the Quota Calendar and rewrites the quota state file to
    /// match, so the administrative surface can read the verdict without
    /// touching the database (spec §3 "Quota state file", §5 "read
    /// atomically; updates rewrite the whole file").
    async fn quota_exhausted_since_last_reset(&self) -> Result<bool, castwatch_error::DatabaseError> {
        let reset = next_reset_utc(Utc::now());
        let previous_reset = reset - chrono::Duration::days(1);
        let failure = self
            .store
            .most_recent_quota_failure_detail_since(previous_reset.naive_utc())
            .await?;

        let state = match &failure {
            Some((at, detail)) => QuotaState::blocked(
                "quota_exceeded",
                detail.clone().unwrap_or_default(),
                DateTime::<Utc>::from_naive_utc_and_offset(*at, Utc),
            ),
            None => QuotaState::unblocked(),
        };
        if let Err(e) = quota_state::write_atomic(self.config.quota_state_path(), &state) {
            warn!(error = %e, "failed to rewrite quota state file");
        }

        Ok(failure.is_some())
    }

    /// Sleeps up to `total`, in 1 s chunks, returning `true` the moment
    /// shutdown is requested (spec §5: "maximum 1 s shutdown latency").
    async fn interruptible_sleep(&self, total: StdDuration) -> bool {
        let mut remaining = total;
        loop {
            if remaining.is_zero() {
                return false;
            }
            let chunk = remaining.min(SLEEP_CHUNK);
            tokio::select! {
                _ = tokio::time::sleep(chunk) => {
                    remaining -= chunk;
                }
                _ = self.shutdown.notified() => {
                    return true;
                }
            }
        }
    }
}

enum DispatchOutcome {
    Completed,
    Failed(String),
    QuotaExceeded,
    AuthenticationFailed(String),
}

fn classify_remote_failure(err: castwatch_error::RemoteError) -> DispatchOutcome {
    match err.kind() {
        RemoteErrorKind::QuotaExceeded(_) => DispatchOutcome::QuotaExceeded,
        RemoteErrorKind::Authentication(reason) => {
            DispatchOutcome::AuthenticationFailed(reason.clone())
        }
        RemoteErrorKind::VideoNotFound(_) | RemoteErrorKind::InvalidRequest(_) => {
            DispatchOutcome::Failed(err.to_string())
        }
        RemoteErrorKind::Network(_) => DispatchOutcome::Failed(err.to_string()),
    }
}

