//! Top-level error wrapper types.

use crate::{BuilderError, ConfigError, HttpError};
#[cfg(feature = "database")]
use crate::DatabaseError;
#[cfg(feature = "remote")]
use crate::RemoteError;
#[cfg(feature = "worker")]
use crate::WorkerError;

/// The workspace-wide error kind. Each variant wraps a concern-specific
/// error type defined elsewhere in this crate.
///
/// # Examples
///
/// ```
/// use castwatch_error::{CastwatchError, HttpError};
///
/// let http_err = HttpError::new("connection failed");
/// let err: CastwatchError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum CastwatchErrorKind {
    /// HTTP transport error.
    #[from(HttpError)]
    Http(HttpError),
    /// Configuration error.
    #[from(ConfigError)]
    Config(ConfigError),
    /// Builder validation error.
    #[from(BuilderError)]
    Builder(BuilderError),
    /// Store (embedded database) error.
    #[cfg(feature = "database")]
    #[from(DatabaseError)]
    Database(DatabaseError),
    /// Remote video platform error.
    #[cfg(feature = "remote")]
    #[from(RemoteError)]
    Remote(RemoteError),
    /// Worker process error.
    #[cfg(feature = "worker")]
    #[from(WorkerError)]
    Worker(WorkerError),
}

/// Castwatch error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("castwatch error: {}", _0)]
pub struct CastwatchError(Box<CastwatchErrorKind>);

impl CastwatchError {
    /// Create a new error from a kind.
    pub fn new(kind: CastwatchErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &CastwatchErrorKind {
        &self.0
    }
}

impl<T> From<T> for CastwatchError
where
    T: Into<CastwatchErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for castwatch operations.
pub type CastwatchResult<T> = std::result::Result<T, CastwatchError>;
