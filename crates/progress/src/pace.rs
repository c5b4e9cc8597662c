//! Learning pace classification.

use serde::Serialize;
use skillroute_core::{Progress, Time};

/// How fast the student is moving through phases.
///
/// Never persisted; recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Pace {
    /// No completion recorded yet
    JustStarted,
    /// 1.5 or more phases per week
    Fast,
    /// At least 0.5 phases per week
    OnTrack,
    /// Below 0.5 phases per week
    TakeYourTime,
}

impl Pace {
    /// Lower bound (inclusive) of the fast band, in phases per week.
    pub const FAST_RATE: f64 = 1.5;

    /// Lower bound (inclusive) of the on-track band, in phases per week.
    pub const ON_TRACK_RATE: f64 = 0.5;

    /// Classify a weekly completion rate.
    pub fn classify_rate(rate: f64) -> Pace {
        if rate >= Self::FAST_RATE {
            Pace::Fast
        } else if rate >= Self::ON_TRACK_RATE {
            Pace::OnTrack
        } else {
            Pace::TakeYourTime
        }
    }

    /// Phases per week given the last activity.
    ///
    /// Whole days elapsed are floored and never less than one.
    pub fn weekly_rate(completed_phases: usize, last_activity: Time, now: Time) -> f64 {
        let days = (now - last_activity).num_days().max(1);
        (completed_phases as f64 * 7.0) / days as f64
    }

    /// Assess pace for `progress` at `now`.
    pub fn assess(progress: &Progress, now: Time) -> Pace {
        match progress.last_activity_date {
            None => Pace::JustStarted,
            Some(last) => Self::classify_rate(Self::weekly_rate(progress.completed_phases, last, now)),
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Pace::JustStarted => "Just Started",
            Pace::Fast => "Fast",
            Pace::OnTrack => "On Track",
            Pace::TakeYourTime => "Take Your Time",
        }
    }
}

impl std::fmt::Display for Pace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
