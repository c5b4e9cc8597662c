//! Recommendations surfaced alongside an active roadmap.

use serde::Serialize;
use skillroute_core::{Phase, Progress};

/// Recommendation category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecommendationKind {
    /// About learning pace and streaks
    Pace,
    /// Points at what to study next
    Resource,
    /// Encouragement near the end
    Motivation,
}

impl RecommendationKind {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationKind::Pace => "pace",
            RecommendationKind::Resource => "resource",
            RecommendationKind::Motivation => "motivation",
        }
    }
}

/// One recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    /// Category
    pub kind: RecommendationKind,
    /// Short title
    pub title: String,
    /// Message body
    pub message: String,
}

impl Recommendation {
    fn new(kind: RecommendationKind, title: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.to_string(),
            message: message.into(),
        }
    }
}

/// Decide which recommendations to surface for `progress` over `phases`.
///
/// At most one pace recommendation is produced, followed by a focus-area
/// hint for the phase at index `completed_phases` and a final-stretch note
/// past 75% completion.
pub fn recommend(progress: &Progress, phases: &[Phase]) -> Vec<Recommendation> {
    let mut out = Vec::new();
    let streak = progress.streak_days;
    let rate = if progress.total_phases > 0 {
        progress.completed_phases as f64 / progress.total_phases as f64 * 100.0
    } else {
        0.0
    };

    if rate < 20.0 && streak < 3 {
        out.push(Recommendation::new(
            RecommendationKind::Pace,
            "Build Momentum",
            "Start with small daily goals. Even 30 minutes a day can build a strong learning habit.",
        ));
    } else if rate > 50.0 && streak > 7 {
        out.push(Recommendation::new(
            RecommendationKind::Pace,
            "Excellent Progress!",
            format!("You're on fire! {streak} days streak. Keep this momentum going!"),
        ));
    } else if streak > 0 {
        out.push(Recommendation::new(
            RecommendationKind::Pace,
            "Stay Consistent",
            format!("{streak} day streak! Consistency is key to mastering new skills."),
        ));
    }

    if let Some(phase) = phases.get(progress.completed_phases) {
        let skills: Vec<&str> = phase.focus_skills.iter().take(2).map(String::as_str).collect();
        let message = if skills.is_empty() {
            format!("Current phase: {}.", phase.label)
        } else {
            format!("Current phase: {}. Focus on {}.", phase.label, skills.join(" and "))
        };
        out.push(Recommendation::new(RecommendationKind::Resource, "Focus Area", message));
    }

    if rate > 75.0 {
        out.push(Recommendation::new(
            RecommendationKind::Motivation,
            "Almost There!",
            "You're in the final stretch! This is where your hard work pays off.",
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phases(n: usize) -> Vec<Phase> {
        (0..n)
            .map(|i| {
                Phase::new(format!("Phase {}", i + 1), "3 weeks")
                    .with_focus_skills(["rust", "tokio", "serde"])
            })
            .collect()
    }

    fn progress(completed: usize, total: usize, streak: u32) -> Progress {
        Progress {
            completed_phases: completed,
            total_phases: total,
            streak_days: streak,
            last_activity_date: None,
        }
    }

    fn titles(recs: &[Recommendation]) -> Vec<&str> {
        recs.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn test_fresh_roadmap_builds_momentum() {
        let recs = recommend(&progress(0, 5, 0), &phases(5));
        assert_eq!(titles(&recs), vec!["Build Momentum", "Focus Area"]);
        assert_eq!(recs[1].message, "Current phase: Phase 1. Focus on rust and tokio.");
    }

    #[test]
    fn test_strong_streak_past_half() {
        let recs = recommend(&progress(4, 5, 8), &phases(5));
        assert_eq!(titles(&recs), vec!["Excellent Progress!", "Focus Area", "Almost There!"]);
        assert!(recs[0].message.contains("8 days streak"));
    }

    #[test]
    fn test_any_streak_stays_consistent() {
        let recs = recommend(&progress(2, 5, 2), &phases(5));
        assert_eq!(recs[0].title, "Stay Consistent");
        assert_eq!(recs[0].kind, RecommendationKind::Pace);
    }

    #[test]
    fn test_no_pace_hint_without_streak() {
        // 40% complete, no streak: neither momentum nor consistency applies
        let recs = recommend(&progress(2, 5, 0), &phases(5));
        assert_eq!(titles(&recs), vec!["Focus Area"]);
    }

    #[test]
    fn test_finished_roadmap_has_no_focus_area() {
        let recs = recommend(&progress(5, 5, 1), &phases(5));
        assert_eq!(titles(&recs), vec!["Stay Consistent", "Almost There!"]);
    }

    #[test]
    fn test_empty_roadmap() {
        let recs = recommend(&progress(0, 0, 0), &[]);
        assert_eq!(titles(&recs), vec!["Build Momentum"]);
    }
}
