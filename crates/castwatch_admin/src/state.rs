//! Shared state handed to every Axum handler.

use castwatch_database::Store;
use castwatch_poller::{PollerHealth, RatingIntake};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything the administrative surface needs, cheap to clone per request.
#[derive(Clone)]
pub struct AdminState {
    pub(crate) store: Store,
    pub(crate) rating_intake: Arc<RatingIntake>,
    pub(crate) poller_health: PollerHealth,
    pub(crate) worker_pid_path: PathBuf,
    pub(crate) quota_state_path: PathBuf,
    pub(crate) poller_staleness_secs: i64,
}

impl AdminState {
    /// Builds the shared state the router's handlers close over.
    pub fn new(
        store: Store,
        rating_intake: RatingIntake,
        poller_health: PollerHealth,
        worker_pid_path: impl Into<PathBuf>,
        quota_state_path: impl Into<PathBuf>,
        poller_staleness_secs: i64,
    ) -> Self {
        Self {
            store,
            rating_intake: Arc::new(rating_intake),
            poller_health,
            worker_pid_path: worker_pid_path.into(),
            quota_state_path: quota_state_path.into(),
            poller_staleness_secs,
        }
    }
}
