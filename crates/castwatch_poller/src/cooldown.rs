//! In-memory per-content-hash play cooldown (spec §4.8 step 4).
//!
//! Not persisted across restarts: a process restart forgets every
//! in-flight cooldown, so a track already counted as a play may be
//! re-counted once immediately after a restart. Accepted; reconciling
//! play counts against wall-clock history is out of scope.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Tracks the last tick at which each content hash was processed, so a
/// track that is still playing across consecutive ticks is not
/// re-counted on every tick.
pub struct PlayCooldown {
    window: Duration,
    seen: Mutex<HashMap<String, Instant>>,
}

impl PlayCooldown {
    /// Builds a cooldown tracker with the given window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// Returns `true` if `content_hash` was last recorded as a play within
    /// the cooldown window. Does not mutate state: checking never slides
    /// the window forward, only an actual recorded play does (see
    /// [`PlayCooldown::touch`]).
    pub fn is_within_cooldown(&self, content_hash: &str) -> bool {
        let seen = self.seen.lock();
        let now = Instant::now();
        seen.get(content_hash)
            .is_some_and(|last| now.duration_since(*last) < self.window)
    }

    /// Stamps `content_hash` as recorded at now. Call only when a play is
    /// actually recorded, so the window slides forward on real plays and
    /// not on every tick.
    pub fn touch(&self, content_hash: &str) {
        self.seen.lock().insert(content_hash.to_string(), Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_check_is_not_within_cooldown() {
        let cooldown = PlayCooldown::new(Duration::from_secs(60));
        assert!(!cooldown.is_within_cooldown("hash-1"));
    }

    #[test]
    fn touch_then_check_within_window_is_cooldown() {
        let cooldown = PlayCooldown::new(Duration::from_secs(60));
        assert!(!cooldown.is_within_cooldown("hash-1"));
        cooldown.touch("hash-1");
        assert!(cooldown.is_within_cooldown("hash-1"));
    }

    #[test]
    fn repeated_checks_without_touch_do_not_slide_the_window() {
        let cooldown = PlayCooldown::new(Duration::from_secs(60));
        cooldown.touch("hash-1");
        assert!(cooldown.is_within_cooldown("hash-1"));
        assert!(cooldown.is_within_cooldown("hash-1"));
        assert!(cooldown.is_within_cooldown("hash-1"));
    }

    #[test]
    fn distinct_hashes_do_not_share_state() {
        let cooldown = PlayCooldown::new(Duration::from_secs(60));
        assert!(!cooldown.is_within_cooldown("hash-1"));
        assert!(!cooldown.is_within_cooldown("hash-2"));
    }
}
