//! Client for the home-automation state endpoint (spec §6).

use castwatch_error::{RemoteError, RemoteErrorKind};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// The currently-playing media snapshot, once a `playing` state with the
/// required attributes has been confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    /// `attributes.media_title`.
    pub media_title: String,
    /// `attributes.media_artist`.
    pub media_artist: Option<String>,
    /// `attributes.media_duration`, in seconds.
    pub media_duration: Option<i32>,
    /// `attributes.app_name`.
    pub app_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StateResponse {
    state: String,
    #[serde(default)]
    attributes: StateAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct StateAttributes {
    media_title: Option<String>,
    media_artist: Option<String>,
    media_duration: Option<i32>,
    app_name: Option<String>,
}

/// Client for `GET {base}/api/states/{entity}`.
#[derive(Debug, Clone)]
pub struct HaClient {
    base_url: String,
    bearer_token: String,
    client: reqwest::Client,
}

impl HaClient {
    /// Builds a client bound to `base_url`, authenticating every request
    /// with `bearer_token`.
    pub fn new(base_url: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: bearer_token.into(),
            client: reqwest::Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .expect("reqwest client always builds"),
        }
    }

    /// Fetches the current state of `entity`. Returns `None` when the
    /// reported state is not `playing`, required attributes are missing, or
    /// `app_name` does not match `expected_app_name`.
    #[instrument(skip(self), fields(entity))]
    pub async fn now_playing(
        &self,
        entity: &str,
        expected_app_name: &str,
    ) -> Result<Option<NowPlaying>, RemoteError> {
        let url = format!("{}/api/states/{entity}", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.bearer_token)
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

        let parsed: StateResponse = response.json().await?;
        if parsed.state != "playing" {
            debug!(state = %parsed.state, "media player not playing");
            return Ok(None);
        }

        let app_name = parsed.attributes.app_name;
        if app_name.as_deref() != Some(expected_app_name) {
            debug!(?app_name, expected_app_name, "app_name does not match");
            return Ok(None);
        }

        let (Some(media_title), media_duration) = (
            parsed.attributes.media_title,
            parsed.attributes.media_duration,
        ) else {
            return Ok(None);
        };

        Ok(Some(NowPlaying {
            media_title,
            media_artist: parsed.attributes.media_artist,
            media_duration,
            app_name,
        }))
    }
}
