//! The Playback Poller (spec §4.8): a periodic home-automation snapshot,
//! resolved through the Cache Lookup, falling back to an enqueued search.
//!
//! The supervised tick loop is grounded on the teacher's
//! `botticelli_models::gemini::client`/`botticelli_rate_limit::limiter`
//! retry idiom: `tokio_retry2::Retry::spawn` with an `ExponentialBackoff`
//! strategy, generalized from "retry one call a bounded number of times"
//! to "retry one tick, and once retries are exhausted, stop polling
//! entirely and report unhealthy".

use crate::cooldown::PlayCooldown;
use crate::health::PollerHealth;
use castwatch_core::hash::content_hash;
use castwatch_core::{QueuePayload, SearchPayloadBuilder};
use castwatch_database::Store;
use castwatch_error::RemoteError;
use castwatch_remote::HaClient;
use std::time::Duration;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, error, info, instrument, warn};

const MAX_BACKOFF: Duration = Duration::from_secs(300);
const MAX_TICK_ATTEMPTS: usize = 10;

/// Tunables the poller needs beyond the clients themselves.
#[derive(Debug, Clone)]
pub struct PlaybackPollerConfig {
    /// Time between ticks while healthy.
    pub tick_interval: Duration,
    /// Per-content-hash play cooldown window.
    pub cooldown: Duration,
    /// Not-found sentinel TTL, in hours.
    pub not_found_ttl_hours: i64,
    /// Entity id of the media player to poll.
    pub media_player_entity: String,
    /// Expected `attributes.app_name` identifying the remote video source.
    pub expected_app_name: String,
}

/// Periodically snapshots the home-automation media player and resolves
/// what is playing to a queue action.
pub struct PlaybackPoller {
    store: Store,
    ha_client: HaClient,
    cooldown: PlayCooldown,
    config: PlaybackPollerConfig,
    health: PollerHealth,
}

impl PlaybackPoller {
    /// Builds a poller over `store` and `ha_client`.
    pub fn new(
        store: Store,
        ha_client: HaClient,
        config: PlaybackPollerConfig,
        health: PollerHealth,
    ) -> Self {
        let cooldown = PlayCooldown::new(config.cooldown);
        Self {
            store,
            ha_client,
            cooldown,
            config,
            health,
        }
    }

    /// A handle other tasks (the admin health endpoint) can read.
    pub fn health_handle(&self) -> PollerHealth {
        self.health.clone()
    }

    /// Runs the supervising loop until shutdown is signalled or ten
    /// consecutive tick failures exhaust the retry budget.
    #[instrument(skip(self))]
    pub async fn run(&self, shutdown: std::sync::Arc<tokio::sync::Notify>) {
        loop {
            let sleep = tokio::time::sleep(self.config.tick_interval);
            tokio::select! {
                _ = sleep => {}
                _ = shutdown.notified() => {
                    info!("poller shutting down");
                    return;
                }
            }

            let strategy = ExponentialBackoff::from_millis(1000)
                .factor(2)
                .max_delay(MAX_BACKOFF)
                .map(jitter)
                .take(MAX_TICK_ATTEMPTS);

            let outcome = Retry::spawn(strategy, || async {
                self.tick().await.map_err(|e| {
                    warn!(error = %e, "poller tick failed, will retry");
                    RetryError::Transient {
                        err: e,
                        retry_after: None,
                    }
                })
            })
            .await;

            match outcome {
                Ok(()) => {
                    self.health.record_tick(chrono::Utc::now());
                }
                Err(e) => {
                    error!(error = %e, "poller exhausted retries, exiting supervising loop");
                    self.health.mark_stopped();
                    return;
                }
            }
        }
    }

    #[instrument(skip(self))]
    async fn tick(&self) -> Result<(), RemoteError> {
        let Some(now_playing) = self
            .ha_client
            .now_playing(&self.config.media_player_entity, &self.config.expected_app_name)
            .await?
        else {
            debug!("nothing relevant playing");
            return Ok(());
        };

        let Some(duration) = now_playing.media_duration else {
            debug!("playing media has no duration, skipping");
            return Ok(());
        };

        let hash = content_hash(
            now_playing.media_artist.as_deref(),
            &now_playing.media_title,
            Some(duration),
        );

        if self.cooldown.is_within_cooldown(&hash) {
            debug!(%hash, "within play cooldown, skipping tick");
            return Ok(());
        }

        let cached = self
            .store
            .cache_lookup(&hash, &now_playing.media_title, Some(duration))
            .await
            .ok()
            .flatten();

        if let Some(video) = cached {
            if let Some(yt_video_id) = &video.yt_video_id {
                match self.store.record_play(yt_video_id).await {
                    Ok(()) => self.cooldown.touch(&hash),
                    Err(e) => warn!(error = %e, "failed to record play"),
                }
            }
            return Ok(());
        }

        let recently_not_found = self
            .store
            .is_recently_not_found(&hash, self.config.not_found_ttl_hours)
            .await
            .unwrap_or(false);
        if recently_not_found {
            debug!(%hash, "recently not found, skipping search enqueue");
            return Ok(());
        }

        // `ha_artist`/`ha_app_name` are `Option<String>` fields under a
        // struct-level `strip_option` builder: their setters take the
        // inner `String`, so an absent value is left at its `#[builder(default)]`
        // rather than passed through as `None`.
        let mut builder = SearchPayloadBuilder::default();
        builder.ha_title(now_playing.media_title.clone());
        builder.ha_duration(duration);
        if let Some(artist) = &now_playing.media_artist {
            builder.ha_artist(artist.clone());
        }
        if let Some(app_name) = &now_playing.app_name {
            builder.ha_app_name(app_name.clone());
        }
        let payload = builder.build();

        match payload {
            Ok(payload) => {
                if let Err(e) = self.store.enqueue(QueuePayload::Search(payload)).await {
                    warn!(error = %e, "failed to enqueue search from poller tick");
                }
            }
            Err(e) => warn!(error = %e, "failed to build search payload"),
        }

        Ok(())
    }
}
