//! Core domain types for the PR thread relay.

pub mod ids;
pub mod pr;

pub use ids::{ChannelId, PrId, PrNumber, ThreadId};
pub use pr::{PrState, PullRequest, Review, ReviewState, User};
