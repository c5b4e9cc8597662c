//! Progress Tracking
//!
//! Pure derivation of completion counts, percentage, pace and
//! recommendations from a roadmap's phases. Nothing here touches the
//! network or the clock; callers pass `now` explicitly.

#![warn(missing_docs)]

pub mod tracker;
pub mod pace;
pub mod streak;
pub mod recommend;

pub use tracker::{derive_progress, completion_percentage, reconcile, ProgressReport};
pub use pace::Pace;
pub use streak::record_completion;
pub use recommend::{recommend, Recommendation, RecommendationKind};
