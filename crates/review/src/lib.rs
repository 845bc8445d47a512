//! `lojapet-review` — the human side of the decision loop.
//!
//! Uncertain decisions land here as [`PendingReview`] entries; a human verdict
//! becomes an append-only [`FeedbackLog`] row and a `decision.reviewed` event
//! that the learning service consumes.

pub mod feedback;
pub mod queue;
pub mod service;
pub mod store;

pub use feedback::FeedbackLog;
pub use queue::{PendingReview, ReviewStatus};
pub use service::{ReviewError, ReviewService};
pub use store::{ReviewStore, ReviewStoreError};
