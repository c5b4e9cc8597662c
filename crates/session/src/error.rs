//! Errors the session lets reach its caller.

use skillroute_core::{ErrorKind, ProfileError};

/// Rejections raised before any network call.
///
/// Everything else a session operation runs into becomes a notification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No profile loaded; the user has to complete profile setup
    #[error("No profile loaded")]
    MissingProfile,

    /// Profile lacks what the operation needs
    #[error("Profile is incomplete: {0}")]
    IncompleteProfile(#[from] ProfileError),

    /// No roadmap loaded
    #[error("No roadmap loaded")]
    NoRoadmap,

    /// Phase index outside the loaded roadmap
    #[error("Phase {index} does not exist (roadmap has {total})")]
    PhaseOutOfRange {
        /// Requested index
        index: usize,
        /// Phase count
        total: usize,
    },
}

impl SessionError {
    /// Taxonomy kind; always a precondition failure.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Precondition
    }
}
