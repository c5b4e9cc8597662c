//! SkillRoute core data models.
//!
//! This crate defines the data structures shared by the roadmap client
//! layers: the student profile, the generated roadmap with its phases,
//! progress counters and the career decision attached to a roadmap.

#![warn(missing_docs)]

// Core identities
mod id;

// Profile and roadmap
mod profile;
mod phase;
mod roadmap;
mod progress;

// Errors and wire helpers
mod error;
mod clock;
pub mod time;

// Re-exports
pub use id::*;

pub use profile::{Profile, ProfileError, ProfilePayload};
pub use phase::{Phase, PhaseStatus, Milestone, LearningResource};
pub use roadmap::{
    ActiveRoadmap, Roadmap, CareerDecision, CareerAlternative, IndustryDemand,
};
pub use progress::Progress;
pub use error::ErrorKind;
pub use clock::{Clock, ManualClock, SystemClock};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
