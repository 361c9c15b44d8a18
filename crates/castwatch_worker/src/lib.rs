//! The Worker process: claims queued rating and search jobs and dispatches
//! them against the remote video platform, respecting the quota calendar
//! and a single-instance PID lock.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod api_accounting;
mod pid_lock;
mod scoring;
mod search_pipeline;
mod worker;

pub use pid_lock::PidLock;
pub use scoring::score_title;
pub use search_pipeline::{ScoredCandidate, SearchPipeline, SearchPipelineConfig};
pub use worker::Worker;
