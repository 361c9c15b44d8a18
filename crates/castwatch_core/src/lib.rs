//! Core domain types for the castwatch quota-aware media orchestrator:
//! the Video record, Queue item types, Content Hasher, Title Cleaner,
//! Duration Parser/Validator, Quota Calendar, quota state file, and
//! configuration.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod category;
mod config;
pub mod duration;
pub mod hash;
mod queue;
pub mod quota_calendar;
pub mod quota_state;
pub mod title;
mod video;

pub use config::CastwatchConfig;
pub use queue::{
    Priority, QueueItem, QueuePayload, QueueStatus, RatingPayload, SearchPayload,
    SearchPayloadBuilder,
};
pub use quota_state::QuotaState;
pub use video::{Rating, Source, Video, VideoBuilder};
