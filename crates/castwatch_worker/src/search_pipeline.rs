//! The Search Pipeline (spec §4.4): one text search, a two-phase batch
//! detail fetch anchored on exact duration match, and opportunistic
//! caching of every video it touches.

use crate::api_accounting::record_outcome;
use crate::scoring::score_title;
use castwatch_core::duration::parse_iso8601_duration;
use castwatch_core::title::clean_title;
use castwatch_core::{Source, Video};
use castwatch_database::{SearchCacheRow, Store};
use castwatch_error::RemoteError;
use castwatch_remote::{QUOTA_COST_SEARCH, VideoDetails, VideoPlatformClient};
use chrono::{NaiveDateTime, Utc};
use tracing::{debug, info, instrument};

/// A candidate match carrying the score it was ranked by.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    /// The candidate video record.
    pub video: Video,
    /// Title similarity score against the search query, `[0.0, 1.0]`.
    pub score: f64,
}

/// Configuration the pipeline needs beyond the clients themselves.
#[derive(Debug, Clone, Copy)]
pub struct SearchPipelineConfig {
    /// Number of ids fetched in the phase-1 batch (spec default 10).
    pub phase1_size: usize,
    /// Number of additional ids fetched in the phase-2 batch (spec default 15).
    pub phase2_size: usize,
    /// TTL, in days, applied to every opportunistically cached result.
    pub search_cache_ttl_days: i64,
}

/// Resolves a playing track to a remote video via search + batch detail
/// fetch, anchored on exact duration match.
pub struct SearchPipeline {
    client: VideoPlatformClient,
    store: Store,
    config: SearchPipelineConfig,
}

impl SearchPipeline {
    /// Builds a pipeline over `client` and `store`.
    pub fn new(client: VideoPlatformClient, store: Store, config: SearchPipelineConfig) -> Self {
        Self {
            client,
            store,
            config,
        }
    }

    /// Runs the full algorithm for `(ha_title, ha_artist, expected_duration)`.
    /// Returns the best candidate, or `None` if nothing matched. Quota and
    /// other remote errors propagate so the Worker can apply its sleep
    /// policy.
    #[instrument(skip(self), fields(ha_title))]
    pub async fn search(
        &self,
        ha_title: &str,
        ha_artist: Option<&str>,
        expected_duration: Option<i32>,
    ) -> Result<Option<ScoredCandidate>, RemoteError> {
        let query = clean_title(ha_title, ha_artist);
        debug!(%query, "built search query");

        let hits = record_outcome(
            &self.store,
            "search.list",
            QUOTA_COST_SEARCH,
            self.client.search(&query, 25).await,
        )
        .await?;

        let mut scored: Vec<(String, String, f64)> = hits
            .into_iter()
            .map(|hit| {
                let score = score_title(&query, &hit.title);
                (hit.video_id, hit.title, score)
            })
            .collect();
        scored.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));

        let ordered_ids: Vec<String> = scored.iter().map(|(id, _, _)| id.clone()).collect();
        let scores_by_id: std::collections::HashMap<String, f64> = scored
            .into_iter()
            .map(|(id, _, score)| (id, score))
            .collect();

        let phase1: Vec<String> = ordered_ids
            .iter()
            .take(self.config.phase1_size)
            .cloned()
            .collect();

        let mut candidates = self
            .fetch_and_filter(&phase1, expected_duration, &scores_by_id)
            .await?;

        if candidates.is_empty() && ordered_ids.len() > self.config.phase1_size {
            let phase2: Vec<String> = ordered_ids
                .iter()
                .skip(self.config.phase1_size)
                .take(self.config.phase2_size)
                .cloned()
                .collect();
            candidates = self
                .fetch_and_filter(&phase2, expected_duration, &scores_by_id)
                .await?;
        }

        if candidates.is_empty() {
            info!(%query, "no matching video found");
            return Ok(None);
        }

        candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        candidates.truncate(10);
        Ok(candidates.into_iter().next())
    }

    async fn fetch_and_filter(
        &self,
        ids: &[String],
        expected_duration: Option<i32>,
        scores_by_id: &std::collections::HashMap<String, f64>,
    ) -> Result<Vec<ScoredCandidate>, RemoteError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cost = ids.len() as i32;
        let details = record_outcome(
            &self.store,
            "videos.list",
            cost,
            self.client.batch_details(ids).await,
        )
        .await?;

        let mut cache_rows = Vec::with_capacity(details.len());
        let mut candidates = Vec::new();
        let expires_at = Utc::now().naive_utc()
            + chrono::Duration::days(self.config.search_cache_ttl_days);

        for detail in details {
            let yt_duration = detail
                .duration_iso8601
                .as_deref()
                .and_then(|d| parse_iso8601_duration(d).ok());

            cache_rows.push(SearchCacheRow {
                yt_video_id: detail.video_id.clone(),
                yt_title: detail.title.clone().unwrap_or_default(),
                yt_channel: detail.channel.clone(),
                yt_channel_id: detail.channel_id.clone(),
                yt_duration,
                yt_description: detail.description.clone(),
                yt_category_id: detail.category_id.clone(),
                expires_at,
            });

            let matches = match (expected_duration, yt_duration) {
                (Some(expected), Some(actual)) => actual == expected || actual == expected + 1,
                (Some(_), None) => false,
                (None, _) => true,
            };
            if !matches {
                continue;
            }

            let score = scores_by_id.get(&detail.video_id).copied().unwrap_or(0.0);
            let video = video_from_details(&detail, yt_duration);
            candidates.push(ScoredCandidate { video, score });
        }

        if let Err(e) = self.store.cache_search_results(cache_rows).await {
            tracing::warn!(error = %e, "failed to cache search results");
        }

        Ok(candidates)
    }
}

fn video_from_details(detail: &VideoDetails, yt_duration: Option<i32>) -> Video {
    // Built as a struct literal rather than through `VideoBuilder`: nearly
    // every field here is already `Option`, and the builder's
    // `strip_option` setters expect the inner type, not the option itself.
    Video {
        yt_video_id: Some(detail.video_id.clone()),
        ha_title: detail.title.clone().unwrap_or_default(),
        ha_artist: None,
        ha_app_name: None,
        ha_duration: None,
        ha_content_hash: String::new(),
        yt_title: detail.title.clone(),
        yt_channel: detail.channel.clone(),
        yt_channel_id: detail.channel_id.clone(),
        yt_description: detail.description.clone(),
        yt_published_at: parse_rfc3339(detail.published_at.as_deref()),
        yt_category_id: detail.category_id.clone(),
        yt_live_broadcast: detail.live_broadcast,
        yt_location: detail.location.clone(),
        yt_recording_date: parse_rfc3339(detail.recording_date.as_deref()),
        yt_duration,
        yt_url: Some(format!(
            "https://www.youtube.com/watch?v={}",
            detail.video_id
        )),
        rating: castwatch_core::Rating::None,
        rating_score: 0,
        play_count: 0,
        date_added: Utc::now().naive_utc(),
        date_last_played: None,
        source: Source::QueueSearch,
        pending_reason: None,
        last_attempt: None,
    }
}

fn parse_rfc3339(raw: Option<&str>) -> Option<NaiveDateTime> {
    raw.and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.naive_utc())
}
