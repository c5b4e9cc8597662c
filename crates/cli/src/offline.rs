//! On-disk state for `--offline` runs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use skillroute_core::{ActiveRoadmap, Profile};
use skillroute_gateway::LocalBackend;

#[derive(Debug, Default, Serialize, Deserialize)]
struct OfflineState {
    #[serde(default)]
    profile: Option<Profile>,
    #[serde(default)]
    roadmap: Option<ActiveRoadmap>,
}

/// Default state file.
pub fn state_path() -> PathBuf {
    PathBuf::from(".skillroute").join("offline.json")
}

/// Start a local backend seeded from `path`, if it exists.
pub fn open(path: &Path) -> Result<Arc<LocalBackend>> {
    let mut backend = LocalBackend::new();
    if path.exists() {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let state: OfflineState = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        if let Some(profile) = state.profile {
            backend = backend.with_profile(profile);
        }
        if let Some(roadmap) = state.roadmap {
            backend = backend.with_roadmap(roadmap);
        }
    }
    Ok(Arc::new(backend))
}

/// Write the backend's state to `path`.
pub fn persist(path: &Path, backend: &LocalBackend) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let state = OfflineState {
        profile: backend.stored_profile(),
        roadmap: backend.stored_roadmap(),
    };
    let json = serde_json::to_string_pretty(&state)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillroute_core::PhaseStatus;
    use skillroute_gateway::{RemoteGateway, StaticCredential};

    #[tokio::test]
    async fn test_state_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("offline.json");
        let profile = Profile::new("Ada", "bachelors", ["Rust"], ["Systems"], "SRE");

        let backend = open(&path).unwrap();
        let gateway = RemoteGateway::new(backend.clone(), StaticCredential::new("t"));
        gateway.save_profile(&profile).await.unwrap();
        gateway.generate_roadmap(&profile).await.unwrap();
        gateway.update_phase(0, PhaseStatus::Completed).await.unwrap();
        persist(&path, &backend).unwrap();

        let reopened = open(&path).unwrap();
        assert_eq!(reopened.stored_profile(), Some(profile));
        let roadmap = reopened.stored_roadmap().unwrap();
        assert!(roadmap.phases()[0].is_completed());
        assert_eq!(roadmap.progress.completed_phases, 1);
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = open(&dir.path().join("offline.json")).unwrap();
        assert!(backend.stored_profile().is_none());
        assert!(backend.stored_roadmap().is_none());
    }
}
