//! Single-instance PID lock file for the Worker process (spec §4.7, §5).
//!
//! Grounded directly on `original_source/queue_worker.py`'s
//! `/tmp/..._queue_worker.pid` handling; the liveness probe is the idiomatic
//! Rust equivalent of Python's `os.kill(pid, 0)`, `nix::sys::signal::kill`
//! with a `None` signal.

use castwatch_error::{WorkerError, WorkerErrorKind};
use nix::sys::signal::kill;
use nix::unistd::Pid;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Holds an exclusive lock on `path` for the lifetime of the process.
/// Dropping it does not release the file; call [`PidLock::release`]
/// explicitly from the shutdown handler so the release is observable.
pub struct PidLock {
    path: PathBuf,
}

impl PidLock {
    /// Acquires the lock at `path`. If the file exists and names a PID that
    /// `kill(pid, None)` reports alive, returns
    /// [`WorkerErrorKind::AlreadyRunning`]. Otherwise (re)writes the file
    /// with the current PID and returns the held lock.
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self, WorkerError> {
        let path = path.into();
        if let Some(existing) = read_pid(&path)? {
            if process_is_alive(existing) {
                return Err(WorkerError::new(WorkerErrorKind::AlreadyRunning(existing)));
            }
            warn!(stale_pid = existing, "replacing stale pid lock file");
        }
        let pid = std::process::id();
        fs::write(&path, pid.to_string())?;
        info!(pid, path = %path.display(), "acquired pid lock");
        Ok(Self { path })
    }

    /// Removes the lock file. Safe to call once during graceful shutdown.
    pub fn release(self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(error = %e, path = %self.path.display(), "failed to remove pid lock file");
        } else {
            info!(path = %self.path.display(), "released pid lock");
        }
    }
}

fn read_pid(path: &Path) -> Result<Option<i32>, std::io::Error> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(raw.trim().parse::<i32>().ok()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

fn process_is_alive(pid: i32) -> bool {
    kill(Pid::from_raw(pid), None).is_ok()
}
