//! Client for the remote video platform's `search`, `videos`, and rating
//! endpoints (spec §6, §4.4, §4.5).

use crate::oauth::{StoredToken, TokenStore, ensure_fresh};
use castwatch_core::Rating;
use castwatch_error::{RemoteError, RemoteErrorKind};
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

/// Quota cost of one `search.list` call.
pub const QUOTA_COST_SEARCH: i32 = 100;
/// Quota cost of one `videos.getRating` call.
pub const QUOTA_COST_GET_RATING: i32 = 1;
/// Quota cost of one `videos.rate` call.
pub const QUOTA_COST_SET_RATING: i32 = 50;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/search";
const VIDEOS_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/videos";

/// One hit from `search.list`, restricted to the fields the Search Pipeline
/// needs to score candidates.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// `id.videoId`.
    pub video_id: String,
    /// `snippet.title`.
    pub title: String,
}

/// One resolved video from `videos.list`, restricted per the fields mask in
/// spec §6.
#[derive(Debug, Clone, Default)]
pub struct VideoDetails {
    /// `id`.
    pub video_id: String,
    /// `snippet.title`.
    pub title: Option<String>,
    /// `snippet.channelTitle`.
    pub channel: Option<String>,
    /// `snippet.channelId`.
    pub channel_id: Option<String>,
    /// `snippet.description`, truncated to 5000 chars by the caller.
    pub description: Option<String>,
    /// `snippet.publishedAt`.
    pub published_at: Option<String>,
    /// `snippet.categoryId`.
    pub category_id: Option<String>,
    /// `snippet.liveBroadcastContent != "none"`.
    pub live_broadcast: Option<bool>,
    /// `recordingDetails.location`.
    pub location: Option<String>,
    /// `recordingDetails.recordingDate`.
    pub recording_date: Option<String>,
    /// `contentDetails.duration`, ISO-8601, parsed by the caller.
    pub duration_iso8601: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: SearchItemSnippet,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct SearchItemSnippet {
    title: String,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideosItem>,
}

#[derive(Debug, Deserialize)]
struct VideosItem {
    id: String,
    #[serde(default)]
    snippet: Option<VideosSnippet>,
    #[serde(default, rename = "contentDetails")]
    content_details: Option<VideosContentDetails>,
    #[serde(default, rename = "recordingDetails")]
    recording_details: Option<VideosRecordingDetails>,
}

#[derive(Debug, Deserialize)]
struct VideosSnippet {
    title: Option<String>,
    #[serde(rename = "channelTitle")]
    channel_title: Option<String>,
    #[serde(rename = "channelId")]
    channel_id: Option<String>,
    description: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    #[serde(rename = "categoryId")]
    category_id: Option<String>,
    #[serde(rename = "liveBroadcastContent")]
    live_broadcast_content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideosContentDetails {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideosRecordingDetails {
    location: Option<VideosLocation>,
    #[serde(rename = "recordingDate")]
    recording_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideosLocation {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RatingResponse {
    items: Vec<RatingItem>,
}

#[derive(Debug, Deserialize)]
struct RatingItem {
    rating: String,
}

/// OAuth-protected client for the remote video platform.
#[derive(Debug, Clone)]
pub struct VideoPlatformClient {
    client_id: String,
    client_secret: String,
    token_store: TokenStore,
    http: reqwest::Client,
}

impl VideoPlatformClient {
    /// Builds a client that lazily authenticates on first use, never on
    /// construction (spec §4.7 step 2: "do not authenticate on startup when
    /// quota is blocked").
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        token_store: TokenStore,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_store,
            http: reqwest::Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .expect("reqwest client always builds"),
        }
    }

    async fn token(&self) -> Result<StoredToken, RemoteError> {
        ensure_fresh(&self.client_id, &self.client_secret, &self.token_store).await
    }

    /// Issues one text search for up to `max_results` results (quota cost
    /// [`QUOTA_COST_SEARCH`]).
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, max_results: u32) -> Result<Vec<SearchHit>, RemoteError> {
        let token = self.token().await?;
        let response = self
            .http
            .get(SEARCH_ENDPOINT)
            .bearer_auth(&token.access_token)
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("type", "video"),
                ("maxResults", &max_results.min(50).to_string()),
                ("fields", "items(id/videoId,snippet/title)"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::new(RemoteErrorKind::classify(
                status.as_u16(),
                &body,
            )));
        }

        let parsed: SearchResponse = response.json().await?;
        Ok(parsed
            .items
            .into_iter()
            .map(|item| SearchHit {
                video_id: item.id.video_id,
                title: item.snippet.title,
            })
            .collect())
    }

    /// Batch-fetches details for `ids` in one call (quota cost =
    /// `ids.len()`).
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn batch_details(&self, ids: &[String]) -> Result<Vec<VideoDetails>, RemoteError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let token = self.token().await?;
        let joined = ids.join(",");
        let response = self
            .http
            .get(VIDEOS_ENDPOINT)
            .bearer_auth(&token.access_token)
            .query(&[
                ("part", "contentDetails,snippet,recordingDetails"),
                ("id", joined.as_str()),
                (
                    "fields",
                    "items(id,snippet,contentDetails/duration,recordingDetails)",
                ),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::new(RemoteErrorKind::classify(
                status.as_u16(),
                &body,
            )));
        }

        let parsed: VideosResponse = response.json().await?;
        Ok(parsed.items.into_iter().map(video_details_from_item).collect())
    }

    /// Fetches the caller's current rating for a single video (quota cost
    /// [`QUOTA_COST_GET_RATING`]).
    #[instrument(skip(self))]
    pub async fn get_rating(&self, video_id: &str) -> Result<Rating, RemoteError> {
        let token = self.token().await?;
        let response = self
            .http
            .get(format!("{VIDEOS_ENDPOINT}/getRating"))
            .bearer_auth(&token.access_token)
            .query(&[("id", video_id)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::new(RemoteErrorKind::classify(
                status.as_u16(),
                &body,
            )));
        }

        let parsed: RatingResponse = response.json().await?;
        let rating = parsed
            .items
            .first()
            .map(|item| item.rating.as_str())
            .unwrap_or("none");
        Ok(match rating {
            "like" => Rating::Like,
            "dislike" => Rating::Dislike,
            _ => Rating::None,
        })
    }

    /// Sets the caller's rating for a single video (quota cost
    /// [`QUOTA_COST_SET_RATING`]). The remote is idempotent so this never
    /// probes current rating first (spec §4.5).
    #[instrument(skip(self))]
    pub async fn set_rating(&self, video_id: &str, rating: Rating) -> Result<(), RemoteError> {
        let token = self.token().await?;
        let rating_str = match rating {
            Rating::None => "none",
            Rating::Like => "like",
            Rating::Dislike => "dislike",
        };
        let response = self
            .http
            .post(format!("{VIDEOS_ENDPOINT}/rate"))
            .bearer_auth(&token.access_token)
            .query(&[("id", video_id), ("rating", rating_str)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::new(RemoteErrorKind::classify(
                status.as_u16(),
                &body,
            )));
        }
        Ok(())
    }
}

fn video_details_from_item(item: VideosItem) -> VideoDetails {
    let snippet = item.snippet.unwrap_or(VideosSnippet {
        title: None,
        channel_title: None,
        channel_id: None,
        description: None,
        published_at: None,
        category_id: None,
        live_broadcast_content: None,
    });
    let location = item
        .recording_details
        .as_ref()
        .and_then(|rd| rd.location.as_ref())
        .map(|loc| format!("{},{}", loc.latitude.unwrap_or(0.0), loc.longitude.unwrap_or(0.0)));

    VideoDetails {
        video_id: item.id,
        title: snippet.title,
        channel: snippet.channel_title,
        channel_id: snippet.channel_id,
        description: snippet.description.map(|d| d.chars().take(5000).collect()),
        published_at: snippet.published_at,
        category_id: snippet.category_id,
        live_broadcast: snippet
            .live_broadcast_content
            .map(|v| v != "none"),
        location,
        recording_date: item
            .recording_details
            .and_then(|rd| rd.recording_date),
        duration_iso8601: item.content_details.and_then(|cd| cd.duration),
    }
}
