//! Shared construction of the Store and remote clients from a loaded
//! [`CastwatchConfig`], used by every subcommand so the wiring lives in
//! one place.

use castwatch_core::CastwatchConfig;
use castwatch_database::Store;
use castwatch_error::CastwatchResult;
use castwatch_remote::{HaClient, TokenStore, VideoPlatformClient};

/// Opens the Store and applies pending migrations.
pub async fn open_store(config: &CastwatchConfig, max_pool_size: u32) -> CastwatchResult<Store> {
    let store = Store::new(
        config.database_path().to_string_lossy().as_ref(),
        max_pool_size,
    )?;
    store.run_migrations().await?;
    Ok(store)
}

/// Builds the home-automation state client.
pub fn build_ha_client(config: &CastwatchConfig) -> HaClient {
    HaClient::new(config.ha_base_url().clone(), config.ha_bearer_token().clone())
}

/// Builds the remote video platform client, with its token store rooted
/// at the configured path.
pub fn build_video_client(config: &CastwatchConfig) -> VideoPlatformClient {
    let token_store = TokenStore::new(config.oauth_token_path().clone());
    VideoPlatformClient::new(
        config.oauth_client_id().clone(),
        config.oauth_client_secret().clone(),
        token_store,
    )
}
