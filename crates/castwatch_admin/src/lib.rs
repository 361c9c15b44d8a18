//! Administrative HTTP surface: composite health, rating intake, and
//! read-only video/queue listings (spec §4.9, §6 "administrative
//! surface").

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod health;
mod rating;
mod router;
mod state;
mod videos;

pub use router::create_router;
pub use state::AdminState;
