//! Error types for the castwatch quota-aware media orchestrator.
//!
//! This crate provides the foundation error types used throughout the
//! castwatch workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use castwatch_error::{CastwatchResult, HttpError};
//!
//! fn fetch_data() -> CastwatchResult<String> {
//!     Err(HttpError::new("Connection refused"))?
//! }
//!
//! match fetch_data() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
#[cfg(feature = "database")]
mod database;
mod error;
mod http;
#[cfg(feature = "remote")]
mod remote;
#[cfg(feature = "worker")]
mod worker;

pub use builder::{BuilderError, BuilderErrorKind};
pub use config::ConfigError;
#[cfg(feature = "database")]
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{CastwatchError, CastwatchErrorKind, CastwatchResult};
pub use http::HttpError;
#[cfg(feature = "remote")]
pub use remote::{RemoteError, RemoteErrorKind};
#[cfg(feature = "worker")]
pub use worker::{WorkerError, WorkerErrorKind};
