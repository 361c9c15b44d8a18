//! Configuration enumerated in spec §6: database path, home-automation
//! connection details, worker/poller timing, and cache TTLs.

use castwatch_error::{CastwatchResult, ConfigError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All tunables the core components need, layered from TOML defaults and
/// environment overrides by the binary crate's composition root.
#[derive(Debug, Clone, Serialize, Deserialize, derive_getters::Getters)]
pub struct CastwatchConfig {
    /// Path to the embedded SQLite database file.
    pub database_path: PathBuf,
    /// Base URL of the home-automation state endpoint.
    pub ha_base_url: String,
    /// Bearer token for the home-automation state endpoint.
    pub ha_bearer_token: String,
    /// Entity id of the media player to poll.
    pub ha_media_player_entity: String,
    /// Expected `attributes.app_name` value identifying the remote video
    /// platform source (e.g. `"YouTube"`); other sources are ignored.
    pub ha_expected_app_name: String,
    /// Seconds between Worker inter-item sleeps (spec §4.7 step 5's floor).
    #[serde(default = "default_worker_poll_interval_secs")]
    pub worker_poll_interval_secs: u64,
    /// Seconds between Playback Poller ticks.
    #[serde(default = "default_poller_interval_secs")]
    pub poller_interval_secs: u64,
    /// Not-found cache TTL, in hours.
    #[serde(default = "default_not_found_ttl_hours")]
    pub not_found_ttl_hours: i64,
    /// Search-result cache TTL, in days.
    #[serde(default = "default_search_cache_ttl_days")]
    pub search_cache_ttl_days: i64,
    /// Path to the quota state file.
    pub quota_state_path: PathBuf,
    /// OAuth2 client id for the remote video platform.
    pub oauth_client_id: String,
    /// OAuth2 client secret for the remote video platform.
    pub oauth_client_secret: String,
    /// Path to the persisted OAuth2 token file (mode `0600`).
    #[serde(default = "default_oauth_token_path")]
    pub oauth_token_path: PathBuf,
    /// Number of ids fetched in the Search Pipeline's phase 1 batch.
    #[serde(default = "default_search_phase1_size")]
    pub search_phase1_size: usize,
    /// Number of ids fetched in the Search Pipeline's phase 2 batch.
    #[serde(default = "default_search_phase2_size")]
    pub search_phase2_size: usize,
    /// Per-content-hash play cooldown, in seconds.
    #[serde(default = "default_play_cooldown_secs")]
    pub play_cooldown_secs: u64,
    /// Path to the Worker's PID lock file.
    #[serde(default = "default_pid_file_path")]
    pub pid_file_path: PathBuf,
}

fn default_worker_poll_interval_secs() -> u64 {
    60
}

fn default_poller_interval_secs() -> u64 {
    30
}

fn default_not_found_ttl_hours() -> i64 {
    168
}

fn default_search_cache_ttl_days() -> i64 {
    30
}

fn default_search_phase1_size() -> usize {
    10
}

fn default_search_phase2_size() -> usize {
    15
}

fn default_play_cooldown_secs() -> u64 {
    3600
}

fn default_pid_file_path() -> PathBuf {
    PathBuf::from("/tmp/castwatch_queue_worker.pid")
}

fn default_oauth_token_path() -> PathBuf {
    PathBuf::from("/var/lib/castwatch/oauth_token.json")
}

impl CastwatchConfig {
    /// Loads configuration from a TOML file, applying the same field
    /// defaults used for environment-sourced configuration.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> CastwatchResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("failed to read config file: {e}")))?;
        let config: CastwatchConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("failed to parse config: {e}")))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_toml_with_defaults() {
        let toml = r#"
            database_path = "/var/lib/castwatch/castwatch.db"
            ha_base_url = "http://homeassistant.local:8123"
            ha_bearer_token = "secret"
            ha_media_player_entity = "media_player.living_room"
            ha_expected_app_name = "YouTube"
            quota_state_path = "/var/lib/castwatch/quota_state.json"
            oauth_client_id = "client-id"
            oauth_client_secret = "client-secret"
        "#;
        let config: CastwatchConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.worker_poll_interval_secs, 60);
        assert_eq!(config.not_found_ttl_hours, 168);
        assert_eq!(config.search_phase1_size, 10);
        assert_eq!(config.search_phase2_size, 15);
        assert_eq!(
            config.oauth_token_path,
            PathBuf::from("/var/lib/castwatch/oauth_token.json")
        );
    }
}
