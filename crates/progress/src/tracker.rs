//! Progress derivation and the read-side progress report.

use serde::Serialize;
use skillroute_core::{ActiveRoadmap, Phase, Progress, Time};

use crate::pace::Pace;

/// Recompute counters from `phases`.
///
/// `completed_phases` and `total_phases` come from the phase list; the
/// streak and last activity are carried over from `prior`.
pub fn derive_progress(phases: &[Phase], prior: &Progress) -> Progress {
    Progress {
        completed_phases: phases.iter().filter(|p| p.is_completed()).count(),
        total_phases: phases.len(),
        streak_days: prior.streak_days,
        last_activity_date: prior.last_activity_date,
    }
}

/// Rounded completion percentage; 0 for an empty roadmap.
pub fn completion_percentage(progress: &Progress) -> u8 {
    if progress.total_phases == 0 {
        return 0;
    }
    let completed = progress.completed_phases.min(progress.total_phases);
    (100.0 * completed as f64 / progress.total_phases as f64).round() as u8
}

/// Bring a server snapshot's counters in line with its phase statuses.
///
/// Returns whether anything changed.
pub fn reconcile(active: &mut ActiveRoadmap) -> bool {
    let derived = derive_progress(active.phases(), &active.progress);
    if derived == active.progress {
        return false;
    }
    active.progress = derived;
    true
}

/// Everything presentation shows about progress, computed at `generated_at`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressReport {
    /// Completed phases
    pub completed_phases: usize,

    /// Total phases
    pub total_phases: usize,

    /// Rounded completion percentage
    pub percentage: u8,

    /// Current streak
    pub streak_days: u32,

    /// Last completion activity
    pub last_activity_date: Option<Time>,

    /// Learning pace
    pub pace: Pace,

    /// Index of the first phase not yet completed
    pub current_phase: Option<usize>,

    /// Index of the phase after the current one
    pub next_phase: Option<usize>,

    /// When this report was computed
    pub generated_at: Time,
}

impl ProgressReport {
    /// Build a report for an active roadmap.
    pub fn build(active: &ActiveRoadmap, now: Time) -> Self {
        let phases = active.phases();
        let progress = derive_progress(phases, &active.progress);
        let current_phase = phases.iter().position(|p| !p.is_completed());
        let next_phase = current_phase
            .map(|i| i + 1)
            .filter(|&i| i < phases.len());

        Self {
            completed_phases: progress.completed_phases,
            total_phases: progress.total_phases,
            percentage: completion_percentage(&progress),
            streak_days: progress.streak_days,
            last_activity_date: progress.last_activity_date,
            pace: Pace::assess(&progress, now),
            current_phase,
            next_phase,
            generated_at: now,
        }
    }

    /// Whether every phase is done.
    pub fn is_complete(&self) -> bool {
        self.total_phases > 0 && self.percentage == 100
    }
}
