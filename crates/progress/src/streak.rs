//! Streak bookkeeping on phase completion.
//!
//! Streaks only move forward: marking a phase back to pending leaves
//! `streak_days` and `last_activity_date` untouched.

use skillroute_core::{Progress, Time};

/// Record a completion at `now`.
///
/// Advances the streak by one day when `now` falls on a different
/// calendar day (UTC) than the last activity, and moves the last activity
/// to `now`. Returns whether the streak advanced.
pub fn record_completion(progress: &mut Progress, now: Time) -> bool {
    let today = now.date_naive();
    let same_day = progress
        .last_activity_date
        .is_some_and(|last| last.date_naive() == today);
    if same_day {
        return false;
    }
    progress.streak_days = progress.streak_days.saturating_add(1);
    progress.last_activity_date = Some(now);
    true
}
