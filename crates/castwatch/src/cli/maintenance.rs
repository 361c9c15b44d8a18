//! The `maintenance` subcommand group: one-shot operator recovery actions.

use crate::cli::commands::MaintenanceCommands;
use crate::setup;
use castwatch_core::{CastwatchConfig, QuotaState, quota_state};
use castwatch_error::{CastwatchResult, ConfigError};
use tracing::info;

/// Dispatches and runs a single maintenance command.
pub async fn run(config: CastwatchConfig, command: MaintenanceCommands) -> CastwatchResult<()> {
    match command {
        MaintenanceCommands::PurgeCache => {
            let store = setup::open_store(&config, 1).await?;
            let purged = store.purge_expired_search_cache().await?;
            info!(purged, "purged expired search cache entries");
        }
        MaintenanceCommands::ResetStaleProcessing => {
            let store = setup::open_store(&config, 1).await?;
            let reset = store.reset_stale_processing().await?;
            info!(reset, "reset stale processing queue items");
        }
        MaintenanceCommands::QuotaGuardReset => {
            quota_state::write_atomic(config.quota_state_path(), &QuotaState::unblocked())
                .map_err(|e| ConfigError::new(format!("failed to reset quota state file: {e}")))?;
            info!("quota state file reset to unblocked");
        }
    }
    Ok(())
}
