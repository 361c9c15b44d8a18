//! Rating Intake (spec §4.9): "rate what is playing now as X". Enqueues
//! only; no synchronous call against the remote video platform is made on
//! the request path.

use castwatch_core::hash::content_hash;
use castwatch_core::{QueuePayload, Rating, RatingPayload, SearchPayloadBuilder};
use castwatch_database::Store;
use castwatch_error::{DatabaseError, RemoteError, RemoteErrorKind};
use castwatch_remote::HaClient;
use tracing::{info, instrument};

/// What the intake did with the request.
#[derive(Debug, Clone, PartialEq)]
pub enum RatingIntakeOutcome {
    /// The playing track was already resolved; a `rating` item was
    /// enqueued directly.
    EnqueuedRating,
    /// The playing track was unresolved; a `search` item carrying
    /// `callback_rating` was enqueued instead.
    EnqueuedSearch,
}

/// Accepts like/dislike requests against whatever is currently playing.
pub struct RatingIntake {
    store: Store,
    ha_client: HaClient,
    media_player_entity: String,
    expected_app_name: String,
}

impl RatingIntake {
    /// Builds an intake bound to `ha_client`'s media player entity.
    pub fn new(
        store: Store,
        ha_client: HaClient,
        media_player_entity: impl Into<String>,
        expected_app_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            ha_client,
            media_player_entity: media_player_entity.into(),
            expected_app_name: expected_app_name.into(),
        }
    }

    /// Rates whatever is currently playing as `rating`. Returns an error
    /// callers should surface as `400 Bad Request` when nothing matching
    /// the configured source is playing.
    #[instrument(skip(self))]
    pub async fn rate_now_playing(&self, rating: Rating) -> Result<RatingIntakeOutcome, RemoteError> {
        let now_playing = self
            .ha_client
            .now_playing(&self.media_player_entity, &self.expected_app_name)
            .await?
            .ok_or_else(|| {
                RemoteError::new(RemoteErrorKind::InvalidRequest(
                    "no matching media currently playing".to_string(),
                ))
            })?;

        let Some(duration) = now_playing.media_duration else {
            return Err(RemoteError::new(RemoteErrorKind::InvalidRequest(
                "playing media has no duration".to_string(),
            )));
        };

        let hash = content_hash(
            now_playing.media_artist.as_deref(),
            &now_playing.media_title,
            Some(duration),
        );

        let cached = self
            .store
            .cache_lookup(&hash, &now_playing.media_title, Some(duration))
            .await
            .ok()
            .flatten();

        if let Some(yt_video_id) = cached.and_then(|v| v.yt_video_id) {
            enqueue_rating(&self.store, yt_video_id, rating).await?;
            info!("rating enqueued against already-resolved video");
            return Ok(RatingIntakeOutcome::EnqueuedRating);
        }

        let mut builder = SearchPayloadBuilder::default();
        builder.ha_title(now_playing.media_title.clone());
        builder.ha_duration(duration);
        builder.callback_rating(rating);
        if let Some(artist) = &now_playing.media_artist {
            builder.ha_artist(artist.clone());
        }
        if let Some(app_name) = &now_playing.app_name {
            builder.ha_app_name(app_name.clone());
        }
        let payload = builder.build().map_err(|e| {
            RemoteError::new(RemoteErrorKind::InvalidRequest(e.to_string()))
        })?;

        self.store
            .enqueue(QueuePayload::Search(payload))
            .await
            .map_err(database_err_to_remote)?;
        info!("search with callback rating enqueued for unresolved video");
        Ok(RatingIntakeOutcome::EnqueuedSearch)
    }
}

async fn enqueue_rating(store: &Store, yt_video_id: String, rating: Rating) -> Result<(), RemoteError> {
    store
        .enqueue(QueuePayload::Rating(RatingPayload {
            yt_video_id,
            rating,
        }))
        .await
        .map_err(database_err_to_remote)
}

fn database_err_to_remote(err: DatabaseError) -> RemoteError {
    RemoteError::new(RemoteErrorKind::Network(err.to_string()))
}
