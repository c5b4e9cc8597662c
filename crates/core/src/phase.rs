//! Phase model - one sequential unit of a learning roadmap.

use serde::{Deserialize, Serialize};
use crate::Time;

/// A phase is a stage of the roadmap with focus skills and outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    /// Phase label (e.g. "Phase 1: Foundations")
    #[serde(rename = "phase")]
    pub label: String,

    /// Duration hint (e.g. "4-6 weeks")
    #[serde(default)]
    pub duration: String,

    /// Difficulty hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,

    /// Skills this phase focuses on, in order
    #[serde(default)]
    pub focus_skills: Vec<String>,

    /// Expected outcomes, in order
    #[serde(default)]
    pub outcomes: Vec<String>,

    /// Milestones
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub milestones: Vec<Milestone>,

    /// Prerequisites
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prerequisites: Vec<String>,

    /// Phase status
    #[serde(default)]
    pub status: PhaseStatus,

    /// When the phase was last marked completed
    #[serde(default, with = "crate::time::option")]
    pub completed_at: Option<Time>,
}

impl Phase {
    /// Create a pending phase.
    pub fn new(label: impl Into<String>, duration: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            duration: duration.into(),
            difficulty: None,
            focus_skills: Vec::new(),
            outcomes: Vec::new(),
            milestones: Vec::new(),
            prerequisites: Vec::new(),
            status: PhaseStatus::Pending,
            completed_at: None,
        }
    }

    /// Set focus skills.
    pub fn with_focus_skills(mut self, skills: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.focus_skills = skills.into_iter().map(Into::into).collect();
        self
    }

    /// Set outcomes.
    pub fn with_outcomes(mut self, outcomes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.outcomes = outcomes.into_iter().map(Into::into).collect();
        self
    }

    /// Set status.
    pub fn with_status(mut self, status: PhaseStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether the phase is completed.
    pub fn is_completed(&self) -> bool {
        self.status == PhaseStatus::Completed
    }
}

/// Phase status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    /// Not done yet
    #[default]
    Pending,
    /// Done
    Completed,
}

impl PhaseStatus {
    /// The status a toggle moves to.
    pub fn toggled(self) -> Self {
        match self {
            PhaseStatus::Completed => PhaseStatus::Pending,
            PhaseStatus::Pending => PhaseStatus::Completed,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseStatus::Pending => "pending",
            PhaseStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A milestone inside a phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    /// Name
    pub name: String,

    /// What to achieve
    #[serde(default)]
    pub description: String,

    /// Estimated effort in hours
    #[serde(default)]
    pub estimated_hours: Option<f64>,

    /// Learning resources
    #[serde(default)]
    pub resources: Vec<LearningResource>,
}

/// A course, document, project or video backing a milestone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningResource {
    /// Resource type (course, documentation, project, video)
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Title
    pub title: String,

    /// URL or description
    #[serde(default)]
    pub url: String,

    /// Time estimate
    #[serde(default)]
    pub duration: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips_status() {
        assert_eq!(PhaseStatus::Pending.toggled(), PhaseStatus::Completed);
        assert_eq!(PhaseStatus::Completed.toggled(), PhaseStatus::Pending);
    }

    #[test]
    fn test_decode_backend_phase() {
        let phase: Phase = serde_json::from_value(serde_json::json!({
            "phase": "Phase 1: Foundations",
            "duration": "4-6 weeks",
            "focus_skills": ["python", "git"],
            "outcomes": ["write scripts"],
            "status": "completed",
            "completed_at": "2024-05-01T10:00:00.000001",
            "milestones": [{"name": "Hello", "resources": [{"type": "video", "title": "Intro"}]}]
        }))
        .unwrap();
        assert!(phase.is_completed());
        assert_eq!(phase.label, "Phase 1: Foundations");
        assert_eq!(phase.milestones[0].resources[0].kind, "video");
        assert!(phase.completed_at.is_some());
    }

    #[test]
    fn test_missing_status_defaults_to_pending() {
        let phase: Phase = serde_json::from_value(serde_json::json!({"phase": "P"})).unwrap();
        assert_eq!(phase.status, PhaseStatus::Pending);
    }
}
