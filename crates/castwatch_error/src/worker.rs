//! Worker-process error taxonomy: the PID lock and the claim/dispatch loop.

/// Worker failure kinds.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
pub enum WorkerErrorKind {
    /// Another process already holds the PID lock and is alive.
    #[display("another worker is already running with pid {_0}")]
    AlreadyRunning(i32),
    /// The PID lock file could not be read or written.
    #[display("pid lock file I/O error: {_0}")]
    PidLockIo(String),
    /// No matching video was found for a `search` queue item.
    #[display("no matching video found")]
    NoMatchFound,
    /// The quota state file could not be read, parsed, or written.
    #[display("quota state file error: {_0}")]
    QuotaStateIo(String),
}

/// Worker error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Worker Error: {kind} at line {line} in {file}")]
pub struct WorkerError {
    /// The kind of failure.
    pub kind: WorkerErrorKind,
    /// Line number where the error was created.
    pub line: u32,
    /// File where the error was created.
    pub file: &'static str,
}

impl WorkerError {
    /// Create a new WorkerError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: WorkerErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &WorkerErrorKind {
        &self.kind
    }
}

impl From<std::io::Error> for WorkerError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        WorkerError::new(WorkerErrorKind::PidLockIo(err.to_string()))
    }
}
