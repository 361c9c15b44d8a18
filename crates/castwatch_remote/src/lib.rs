//! HTTP clients for the castwatch quota-aware media orchestrator's two
//! external collaborators: the home-automation state source and the remote
//! video platform.
//!
//! Client construction never performs I/O; OAuth2 token refresh happens
//! lazily on first request, matching the Worker's requirement to stay
//! unauthenticated while quota is known to be exhausted.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod ha_client;
mod oauth;
mod video_client;

pub use ha_client::{HaClient, NowPlaying};
pub use oauth::{StoredToken, TokenStore, ensure_fresh, refresh_access_token};
pub use video_client::{
    QUOTA_COST_GET_RATING, QUOTA_COST_SEARCH, QUOTA_COST_SET_RATING, SearchHit, VideoDetails,
    VideoPlatformClient,
};
