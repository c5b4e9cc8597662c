//! Profile model - what the student tells us about themselves.

use serde::{Deserialize, Serialize};

/// Student profile used as input to roadmap generation.
///
/// On the wire skills and interests travel as `", "`-joined strings; in
/// memory they are ordered tag lists without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "ProfilePayload", into = "ProfilePayload")]
pub struct Profile {
    /// Display name
    pub name: String,

    /// Education level (e.g. "bachelors")
    pub education: String,

    /// Skill tags
    pub skills: Vec<String>,

    /// Interest tags
    pub interests: Vec<String>,

    /// Free-text career goals
    pub goals: String,

    /// Free-text prior experience
    pub experience: Option<String>,
}

/// Profile validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    /// Name is blank
    #[error("Name is required")]
    MissingName,

    /// Education is blank
    #[error("Education level is required")]
    MissingEducation,

    /// No skill tags
    #[error("At least one skill is required")]
    NoSkills,

    /// No interest tags
    #[error("At least one interest is required")]
    NoInterests,

    /// Goals are blank
    #[error("Career goals are required")]
    MissingGoals,
}

impl Profile {
    /// Create a profile, normalizing the tag lists.
    pub fn new(
        name: impl Into<String>,
        education: impl Into<String>,
        skills: impl IntoIterator<Item = impl Into<String>>,
        interests: impl IntoIterator<Item = impl Into<String>>,
        goals: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            education: education.into(),
            skills: normalize_tags(skills.into_iter().map(Into::into)),
            interests: normalize_tags(interests.into_iter().map(Into::into)),
            goals: goals.into(),
            experience: None,
        }
    }

    /// Set prior experience.
    pub fn with_experience(mut self, experience: impl Into<String>) -> Self {
        let experience = experience.into();
        self.experience = if experience.trim().is_empty() { None } else { Some(experience) };
        self
    }

    /// Check the invariant roadmap generation depends on.
    pub fn ensure_roadmap_ready(&self) -> Result<(), ProfileError> {
        if self.skills.is_empty() {
            return Err(ProfileError::NoSkills);
        }
        if self.interests.is_empty() {
            return Err(ProfileError::NoInterests);
        }
        Ok(())
    }

    /// Check every field the backend requires before accepting a save.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.name.trim().is_empty() {
            return Err(ProfileError::MissingName);
        }
        if self.education.trim().is_empty() {
            return Err(ProfileError::MissingEducation);
        }
        self.ensure_roadmap_ready()?;
        if self.goals.trim().is_empty() {
            return Err(ProfileError::MissingGoals);
        }
        Ok(())
    }
}

/// Wire form of [`Profile`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilePayload {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Education level
    #[serde(default)]
    pub education: String,
    /// Comma-joined skill tags
    #[serde(default)]
    pub skills: String,
    /// Comma-joined interest tags
    #[serde(default)]
    pub interests: String,
    /// Career goals
    #[serde(default)]
    pub goals: String,
    /// Prior experience
    #[serde(default)]
    pub experience: Option<String>,
}

impl From<ProfilePayload> for Profile {
    fn from(p: ProfilePayload) -> Self {
        Self {
            name: p.name,
            education: p.education,
            skills: split_tags(&p.skills),
            interests: split_tags(&p.interests),
            goals: p.goals,
            experience: p.experience.filter(|e| !e.trim().is_empty()),
        }
    }
}

impl From<Profile> for ProfilePayload {
    fn from(p: Profile) -> Self {
        Self {
            name: p.name,
            education: p.education,
            skills: p.skills.join(", "),
            interests: p.interests.join(", "),
            goals: p.goals,
            experience: Some(p.experience.unwrap_or_default()),
        }
    }
}

fn split_tags(raw: &str) -> Vec<String> {
    normalize_tags(raw.split(',').map(str::to_string))
}

fn normalize_tags(tags: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Profile {
        Profile::new("Ada", "bachelors", ["Python", "SQL"], ["Data Science"], "Data engineer")
    }

    #[test]
    fn test_wire_form_joins_tags() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["skills"], "Python, SQL");
        assert_eq!(json["interests"], "Data Science");
        assert_eq!(json["experience"], "");
    }

    #[test]
    fn test_decode_splits_and_dedupes() {
        let profile: Profile = serde_json::from_value(serde_json::json!({
            "name": "Ada",
            "education": "bachelors",
            "skills": "Python, , SQL,Python",
            "interests": "ML",
            "goals": "x",
            "user_id": "ignored"
        }))
        .unwrap();
        assert_eq!(profile.skills, vec!["Python", "SQL"]);
        assert_eq!(profile.experience, None);
    }

    #[test]
    fn test_validate_requires_fields() {
        assert!(sample().validate().is_ok());

        let mut p = sample();
        p.name = "  ".into();
        assert_eq!(p.validate(), Err(ProfileError::MissingName));

        let mut p = sample();
        p.interests.clear();
        assert_eq!(p.validate(), Err(ProfileError::NoInterests));
        assert_eq!(p.ensure_roadmap_ready(), Err(ProfileError::NoInterests));

        let mut p = sample();
        p.goals.clear();
        assert_eq!(p.validate(), Err(ProfileError::MissingGoals));
        // generation only cares about tags
        assert!(p.ensure_roadmap_ready().is_ok());
    }
}
