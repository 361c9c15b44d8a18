//! Quota state file: a small JSON blob recording whether the remote
//! platform's daily quota is currently believed exhausted, persisted
//! outside the database so the Worker (a separate OS process) and the
//! administrative surface can share the signal without contending on the
//! database's single-writer mutex.
//!
//! The Quota Calendar's [`crate::quota_calendar`] module remains the
//! ground truth: `quota_exhausted_since_last_reset()` derives the answer
//! from the API call log. This file is a write-through cache of that
//! derived answer, rewritten by the Worker every time it re-checks, and
//! read by anything that only needs the current verdict.
//!
//! Grounded on the teacher's temp-file-then-rename atomic write pattern
//! (`botticelli`'s filesystem media storage) and the PID lock's plain
//! `std::fs` read idiom.

use castwatch_error::{WorkerError, WorkerErrorKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// The persisted quota-exhaustion verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaState {
    /// Whether the daily quota is currently believed exhausted.
    pub blocked: bool,
    /// Short machine-facing reason, e.g. `"quota_exceeded"`.
    pub reason: Option<String>,
    /// Human-facing detail, typically the remote platform's error message.
    pub detail: Option<String>,
    /// When this verdict was recorded.
    pub blocked_at: Option<DateTime<Utc>>,
}

impl QuotaState {
    /// The default, optimistic state assumed when no file exists yet.
    pub fn unblocked() -> Self {
        Self {
            blocked: false,
            reason: None,
            detail: None,
            blocked_at: None,
        }
    }

    /// A blocked verdict recorded at `now`.
    pub fn blocked(reason: impl Into<String>, detail: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            blocked: true,
            reason: Some(reason.into()),
            detail: Some(detail.into()),
            blocked_at: Some(now),
        }
    }
}

/// Reads the quota state file at `path`. A missing file is treated as
/// [`QuotaState::unblocked`] rather than an error, since the file is only
/// ever created on the first observed quota failure.
pub fn read_atomic(path: &Path) -> Result<QuotaState, WorkerError> {
    match fs::read_to_string(path) {
        Ok(raw) => serde_json::from_str(&raw)
            .map_err(|e| WorkerError::new(WorkerErrorKind::QuotaStateIo(e.to_string()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(QuotaState::unblocked()),
        Err(e) => Err(WorkerError::new(WorkerErrorKind::QuotaStateIo(e.to_string()))),
    }
}

/// Rewrites the whole quota state file at `path`: written to a sibling
/// `.tmp` file first, then renamed into place, so a reader never observes
/// a partially-written file.
pub fn write_atomic(path: &Path, state: &QuotaState) -> Result<(), WorkerError> {
    let body = serde_json::to_string_pretty(state)
        .map_err(|e| WorkerError::new(WorkerErrorKind::QuotaStateIo(e.to_string())))?;
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, body)
        .map_err(|e| WorkerError::new(WorkerErrorKind::QuotaStateIo(e.to_string())))?;
    fs::rename(&temp_path, path)
        .map_err(|e| WorkerError::new(WorkerErrorKind::QuotaStateIo(e.to_string())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_reads_as_unblocked() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quota_state.json");
        assert_eq!(read_atomic(&path).unwrap(), QuotaState::unblocked());
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quota_state.json");
        let now: DateTime<Utc> = "2024-06-10T19:33:00Z".parse().unwrap();
        let state = QuotaState::blocked("quota_exceeded", "dailyLimitExceeded", now);
        write_atomic(&path, &state).unwrap();
        assert_eq!(read_atomic(&path).unwrap(), state);
    }

    #[test]
    fn write_leaves_no_temp_file_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quota_state.json");
        write_atomic(&path, &QuotaState::unblocked()).unwrap();
        assert!(!dir.path().join("quota_state.tmp").exists());
    }
}
