//! Shared health state for the poller's supervising loop, read by the
//! admin surface's composite health endpoint ("recent poller activity").

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

/// A cloneable handle onto the poller's last-tick timestamp and
/// supervising-loop status.
#[derive(Clone)]
pub struct PollerHealth(Arc<Inner>);

struct Inner {
    running: AtomicBool,
    last_tick_unix: AtomicI64,
}

impl PollerHealth {
    /// Builds a handle with no recorded ticks, marked running.
    pub fn new() -> Self {
        Self(Arc::new(Inner {
            running: AtomicBool::new(true),
            last_tick_unix: AtomicI64::new(0),
        }))
    }

    /// Records a successful tick at `at`.
    pub fn record_tick(&self, at: DateTime<Utc>) {
        self.0.last_tick_unix.store(at.timestamp(), Ordering::Relaxed);
    }

    /// Marks the supervising loop as having given up.
    pub fn mark_stopped(&self) {
        self.0.running.store(false, Ordering::Relaxed);
    }

    /// `true` while the supervising loop has not exhausted its retries.
    pub fn is_running(&self) -> bool {
        self.0.running.load(Ordering::Relaxed)
    }

    /// Unix timestamp of the last successful tick, or `0` if none yet.
    pub fn last_tick_unix(&self) -> i64 {
        self.0.last_tick_unix.load(Ordering::Relaxed)
    }
}

impl Default for PollerHealth {
    fn default() -> Self {
        Self::new()
    }
}
