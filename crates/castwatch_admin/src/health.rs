//! Composite health endpoint: database reachability, worker PID liveness,
//! quota headroom, and recent poller activity.

use crate::state::AdminState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use castwatch_core::quota_state;
use chrono::Utc;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use serde::Serialize;
use std::fs;

#[derive(Debug, Serialize)]
struct HealthReport {
    healthy: bool,
    database_reachable: bool,
    worker_running: bool,
    quota_headroom: bool,
    poller_recently_active: bool,
}

/// `GET /health`: `200` iff every sub-check passes, `503` otherwise.
pub async fn health(State(state): State<AdminState>) -> (StatusCode, Json<HealthReport>) {
    let database_reachable = state.store.health_check().await.is_ok();
    let worker_running = worker_pid_alive(&state.worker_pid_path);
    let quota_headroom = !quota_exhausted(&state);
    let poller_recently_active = poller_recently_active(&state);

    let healthy =
        database_reachable && worker_running && quota_headroom && poller_recently_active;

    let report = HealthReport {
        healthy,
        database_reachable,
        worker_running,
        quota_headroom,
        poller_recently_active,
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}

fn worker_pid_alive(path: &std::path::Path) -> bool {
    let Ok(raw) = fs::read_to_string(path) else {
        return false;
    };
    let Ok(pid) = raw.trim().parse::<i32>() else {
        return false;
    };
    kill(Pid::from_raw(pid), None).is_ok()
}

/// Reads the quota state file the Worker rewrites on every check, rather
/// than querying the database directly, so the administrative process
/// never contends with the Worker's single-writer mutex for this check.
fn quota_exhausted(state: &AdminState) -> bool {
    quota_state::read_atomic(&state.quota_state_path)
        .map(|s| s.blocked)
        .unwrap_or(false)
}

fn poller_recently_active(state: &AdminState) -> bool {
    let last_tick = state.poller_health.last_tick_unix();
    if last_tick == 0 {
        return false;
    }
    let age = Utc::now().timestamp() - last_tick;
    state.poller_health.is_running() && age <= state.poller_staleness_secs
}
