//! The `worker` subcommand: runs the Worker process to completion.

use crate::setup;
use castwatch_core::CastwatchConfig;
use castwatch_error::CastwatchResult;
use castwatch_worker::Worker;
use tracing::info;

/// Runs the Worker until shutdown, returning the process exit code.
pub async fn run(config: CastwatchConfig) -> CastwatchResult<i32> {
    let store = setup::open_store(&config, 4).await?;
    let client = setup::build_video_client(&config);
    let worker = Worker::new(store, client, config);

    let shutdown = worker.shutdown_handle();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C signal handler");
        shutdown.notify_one();
    });

    info!("worker starting, press CTRL+C to stop");
    let exit_code = worker.run().await?;
    info!(exit_code, "worker stopped");
    Ok(exit_code)
}
