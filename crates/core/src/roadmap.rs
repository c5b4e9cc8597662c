//! Roadmap model - the generated curriculum and the career it targets.

use serde::{Deserialize, Deserializer, Serialize};
use crate::phase::Phase;
use crate::progress::Progress;
use crate::Time;

/// Ordered learning curriculum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roadmap {
    /// Overall duration in months
    #[serde(default, deserialize_with = "lenient_months")]
    pub duration_months: u32,

    /// Phases in curriculum order
    #[serde(rename = "roadmap", default)]
    pub phases: Vec<Phase>,
}

impl Roadmap {
    /// Create a roadmap from phases.
    pub fn new(duration_months: u32, phases: Vec<Phase>) -> Self {
        Self { duration_months, phases }
    }
}

/// The user's active roadmap as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveRoadmap {
    /// Career the roadmap targets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub career_decision: Option<CareerDecision>,

    /// The curriculum
    pub learning_roadmap: Roadmap,

    /// Progress counters
    #[serde(default)]
    pub progress: Progress,

    /// Last server-side update
    #[serde(default, with = "crate::time::option", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Time>,
}

impl ActiveRoadmap {
    /// Phases in order.
    pub fn phases(&self) -> &[Phase] {
        &self.learning_roadmap.phases
    }
}

/// Career chosen for the student. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerDecision {
    /// Career label
    pub career: String,

    /// Why this career was chosen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,

    /// Confidence (0-100)
    #[serde(default)]
    pub confidence: f64,

    /// Skill match (0-100)
    #[serde(default)]
    pub skill_match_percentage: f64,

    /// Market readiness (0-100)
    #[serde(default)]
    pub market_readiness: f64,

    /// Demand trend
    #[serde(default)]
    pub industry_demand: IndustryDemand,

    /// Strengths found in the profile
    #[serde(default)]
    pub key_strengths: Vec<String>,

    /// Gaps to close
    #[serde(default)]
    pub skill_gaps: Vec<String>,

    /// Estimate until job-ready
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub time_to_job_ready: Option<String>,

    /// Other careers considered
    #[serde(default)]
    pub alternatives: Vec<CareerAlternative>,
}

impl CareerDecision {
    /// Confidence clamped to 0-100.
    pub fn confidence(&self) -> f64 {
        clamp_percent(self.confidence)
    }

    /// Skill match clamped to 0-100.
    pub fn skill_match(&self) -> f64 {
        clamp_percent(self.skill_match_percentage)
    }

    /// Market readiness clamped to 0-100.
    pub fn market_readiness(&self) -> f64 {
        clamp_percent(self.market_readiness)
    }
}

/// Alternative career suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerAlternative {
    /// Career label
    pub career: String,
    /// Match score (0-100)
    #[serde(default)]
    pub match_score: f64,
    /// Reason
    #[serde(default)]
    pub reason: String,
}

/// Industry demand trend.
///
/// `trending` and `stable` decode as themselves; anything else is treated
/// as emerging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum IndustryDemand {
    /// High demand
    Trending,
    /// Steady demand
    #[default]
    Stable,
    /// New or uncertain demand
    Emerging,
}

impl From<String> for IndustryDemand {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "trending" => IndustryDemand::Trending,
            "stable" => IndustryDemand::Stable,
            _ => IndustryDemand::Emerging,
        }
    }
}

fn clamp_percent(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 100.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn lenient_months<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Number(n)) if n.is_finite() && n > 0.0 => n.round() as u32,
        Some(NumberOrText::Text(s)) => s
            .split(|c: char| !c.is_ascii_digit())
            .find(|part| !part.is_empty())
            .and_then(|part| part.parse().ok())
            .unwrap_or(0),
        _ => 0,
    })
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Number(n)) => Some(n.to_string()),
        Some(NumberOrText::Text(s)) => Some(s),
        None => None,
    })
}
