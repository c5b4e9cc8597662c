//! Progress counters attached to an active roadmap.

use serde::{Deserialize, Serialize};
use crate::Time;

/// Progress tracking for a roadmap.
///
/// `completed_phases` always equals the number of completed phases once a
/// snapshot has been reconciled, and never exceeds `total_phases`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Completed phases
    #[serde(default)]
    pub completed_phases: usize,

    /// Total phases
    #[serde(default)]
    pub total_phases: usize,

    /// Consecutive active days
    #[serde(default)]
    pub streak_days: u32,

    /// Last completion activity
    #[serde(default, with = "crate::time::option")]
    pub last_activity_date: Option<Time>,
}

impl Progress {
    /// Fresh progress for a roadmap with `total_phases` phases.
    pub fn new(total_phases: usize) -> Self {
        Self {
            total_phases,
            ..Self::default()
        }
    }
}
