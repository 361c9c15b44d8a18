//! The `serve` subcommand: runs the Playback Poller and the
//! administrative HTTP surface as supervised background tasks.

use crate::setup;
use castwatch_core::CastwatchConfig;
use castwatch_error::{CastwatchResult, ConfigError};
use castwatch_poller::{PlaybackPoller, PlaybackPollerConfig, PollerHealth, RatingIntake};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tracing::info;

/// Runs the poller and the admin HTTP surface until shutdown.
pub async fn run(config: CastwatchConfig, bind: String) -> CastwatchResult<()> {
    let poller_store = setup::open_store(&config, 4).await?;
    let admin_store = poller_store.clone();
    let ha_client = setup::build_ha_client(&config);
    let rating_ha_client = setup::build_ha_client(&config);

    let health = PollerHealth::new();
    let poller_config = PlaybackPollerConfig {
        tick_interval: Duration::from_secs(*config.poller_interval_secs()),
        cooldown: Duration::from_secs(*config.play_cooldown_secs()),
        not_found_ttl_hours: *config.not_found_ttl_hours(),
        media_player_entity: config.ha_media_player_entity().clone(),
        expected_app_name: config.ha_expected_app_name().clone(),
    };
    let poller = PlaybackPoller::new(poller_store, ha_client, poller_config, health.clone());

    let rating_intake = RatingIntake::new(
        admin_store.clone(),
        rating_ha_client,
        config.ha_media_player_entity().clone(),
        config.ha_expected_app_name().clone(),
    );

    let admin_state = castwatch_admin::AdminState::new(
        admin_store,
        rating_intake,
        health,
        config.pid_file_path().clone(),
        config.quota_state_path().clone(),
        *config.poller_interval_secs() as i64 * 3,
    );
    let router = castwatch_admin::create_router(admin_state);

    let shutdown = Arc::new(Notify::new());
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C signal handler");
        signal_shutdown.notify_waiters();
    });

    let listener = TcpListener::bind(&bind)
        .await
        .map_err(|e| ConfigError::new(format!("failed to bind {bind}: {e}")))?;
    info!(%bind, "admin surface listening");

    let poller_shutdown = shutdown.clone();
    let poller_task = tokio::spawn(async move { poller.run(poller_shutdown).await });

    let server_shutdown = shutdown.clone();
    let server_task = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move { server_shutdown.notified().await })
            .await
    });

    let (poller_result, server_result) = tokio::join!(poller_task, server_task);
    poller_result.map_err(|e| ConfigError::new(format!("poller task panicked: {e}")))?;
    server_result
        .map_err(|e| ConfigError::new(format!("admin server task panicked: {e}")))?
        .map_err(|e| ConfigError::new(format!("admin server error: {e}")))?;

    info!("serve stopped");
    Ok(())
}
