//! Embedded SQLite persistence for the castwatch quota-aware media
//! orchestrator.
//!
//! [`Store`] is the sole entry point: a cloneable pool handle offering the
//! video record, work queue, search-result cache, not-found cache, and API
//! usage accounting described in the system's design. Every blocking Diesel
//! call runs inside [`tokio::task::spawn_blocking`], following the pattern
//! this crate is grounded on: `botticelli_actor::state_persistence`'s
//! `DatabaseStatePersistence`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod models;
mod schema;
mod store;

pub use models::{NewQueueItemRow, NewVideoRow, QueueItemRow, SearchCacheRow, VideoRow};
pub use store::{DatabaseResult, Store};
