//! The Playback Poller and Rating Intake: periodic home-automation
//! snapshots and like/dislike requests, both resolved through the Cache
//! Lookup and falling back to an enqueued search.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cooldown;
mod health;
mod poller;
mod rating_intake;

pub use cooldown::PlayCooldown;
pub use health::PollerHealth;
pub use poller::{PlaybackPoller, PlaybackPollerConfig};
pub use rating_intake::{RatingIntake, RatingIntakeOutcome};
