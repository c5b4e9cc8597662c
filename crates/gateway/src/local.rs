//! In-process backend.
//!
//! Implements the backend contract behind the [`Transport`] seam so the
//! session can run offline and tests can drive it without a server.
//! Roadmaps come from a deterministic template rather than a model.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use skillroute_core::{
    ActiveRoadmap, CareerDecision, Clock, IndustryDemand, Phase, PhaseStatus, Profile, Progress,
    Roadmap, SystemClock,
};
use skillroute_progress::{derive_progress, record_completion};
use tracing::debug;

use crate::endpoint::{ApiRequest, ApiResponse, Endpoint};
use crate::error::{GatewayError, Result};
use crate::transport::Transport;

/// Most recent calls kept for [`LocalBackend::calls`].
pub const CALL_LOG_LIMIT: usize = 256;

#[derive(Default)]
struct LocalState {
    profile: Option<Profile>,
    active: Option<ActiveRoadmap>,
    adaptations: u32,
    calls: VecDeque<Endpoint>,
    failures: Vec<(Endpoint, u16)>,
    offline: bool,
}

/// Backend that keeps one user's profile and roadmap in memory.
pub struct LocalBackend {
    state: Mutex<LocalState>,
    clock: Arc<dyn Clock>,
    latency: Mutex<Option<Duration>>,
    expected_token: Option<String>,
}

#[derive(Deserialize)]
struct PhaseUpdate {
    phase_index: usize,
    status: PhaseStatus,
}

impl LocalBackend {
    /// Empty backend on the wall clock, accepting any token.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Empty backend on a custom clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(LocalState::default()),
            clock,
            latency: Mutex::new(None),
            expected_token: None,
        }
    }

    /// Reject requests whose bearer token differs from `token`.
    pub fn require_token(mut self, token: impl Into<String>) -> Self {
        self.expected_token = Some(token.into());
        self
    }

    /// Seed a stored profile.
    pub fn with_profile(self, profile: Profile) -> Self {
        self.state().profile = Some(profile);
        self
    }

    /// Seed an active roadmap.
    pub fn with_roadmap(self, active: ActiveRoadmap) -> Self {
        self.state().active = Some(active);
        self
    }

    /// Delay every response by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock().unwrap_or_else(|e| e.into_inner()) = latency;
    }

    /// Answer the next call to `endpoint` with `status`.
    pub fn fail_next(&self, endpoint: Endpoint, status: u16) {
        self.state().failures.push((endpoint, status));
    }

    /// Simulate a dropped connection for every call.
    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    /// Most recent endpoints called, oldest first, up to [`CALL_LOG_LIMIT`].
    pub fn calls(&self) -> Vec<Endpoint> {
        self.state().calls.iter().copied().collect()
    }

    /// How many of the logged calls went to `endpoint`.
    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        self.state().calls.iter().filter(|e| **e == endpoint).count()
    }

    /// Stored profile, if any.
    pub fn stored_profile(&self) -> Option<Profile> {
        self.state().profile.clone()
    }

    /// Stored roadmap, if any.
    pub fn stored_roadmap(&self) -> Option<ActiveRoadmap> {
        self.state().active.clone()
    }

    fn state(&self) -> MutexGuard<'_, LocalState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let mut state = self.state();
        let endpoint = request.endpoint;

        if let Some(pos) = state.failures.iter().position(|(e, _)| *e == endpoint) {
            let (_, status) = state.failures.remove(pos);
            return ApiResponse::new(status, json!({"detail": "Injected failure"}));
        }

        let now = self.clock.now();
        match endpoint {
            Endpoint::FetchProfile => match &state.profile {
                Some(profile) => ok(json!(profile)),
                None => ok(json!({"message": "No profile found"})),
            },
            Endpoint::SaveProfile => {
                let Some(profile) = parse::<Profile>(request) else {
                    return unprocessable();
                };
                if let Err(e) = profile.validate() {
                    return ApiResponse::new(400, json!({"detail": e.to_string()}));
                }
                state.profile = Some(profile.clone());
                ok(json!({
                    "status": "success",
                    "message": "Profile saved successfully",
                    "profile": profile,
                }))
            }
            Endpoint::FetchRoadmap => match &state.active {
                Some(active) => ok(json!(active)),
                None => ok(json!({"message": "No active roadmap"})),
            },
            Endpoint::GenerateRoadmap => {
                let Some(profile) = parse::<Profile>(request) else {
                    return unprocessable();
                };
                let mut active = template_roadmap(&profile, 0);
                active.updated_at = Some(now);
                state.adaptations = 0;
                state.active = Some(active.clone());
                ok(json!(active))
            }
            Endpoint::DeleteRoadmap => {
                state.active = None;
                state.adaptations = 0;
                ApiResponse::new(200, Value::Null)
            }
            Endpoint::UpdatePhase => {
                let Some(update) = parse::<PhaseUpdate>(request) else {
                    return unprocessable();
                };
                let Some(active) = state.active.as_mut() else {
                    return not_found("Roadmap or phase not found");
                };
                let Some(phase) = active.learning_roadmap.phases.get_mut(update.phase_index) else {
                    return not_found("Roadmap or phase not found");
                };
                phase.status = update.status;
                phase.completed_at = match update.status {
                    PhaseStatus::Completed => Some(now),
                    PhaseStatus::Pending => None,
                };
                active.progress = derive_progress(&active.learning_roadmap.phases, &active.progress);
                if update.status == PhaseStatus::Completed {
                    record_completion(&mut active.progress, now);
                }
                active.updated_at = Some(now);
                ok(json!({"status": "success", "message": "Progress updated"}))
            }
            Endpoint::AdaptRoadmap => {
                let Some(current) = state.active.clone() else {
                    return not_found("No active roadmap found");
                };
                let profile = state.profile.clone().unwrap_or_default();
                state.adaptations += 1;
                let adapted = adapt(&current, &profile, state.adaptations, now);
                state.active = Some(adapted.clone());
                ok(json!({
                    "status": "success",
                    "career_decision": adapted.career_decision,
                    "learning_roadmap": adapted.learning_roadmap,
                    "progress": adapted.progress,
                }))
            }
        }
    }
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for LocalBackend {
    async fn send(&self, request: &ApiRequest, bearer: &str) -> Result<ApiResponse> {
        let operation = request.endpoint.operation();
        let (offline, latency) = {
            let mut state = self.state();
            if state.calls.len() == CALL_LOG_LIMIT {
                state.calls.pop_front();
            }
            state.calls.push_back(request.endpoint);
            let latency = *self.latency.lock().unwrap_or_else(|e| e.into_inner());
            (state.offline, latency)
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if offline {
            return Err(GatewayError::Transport {
                operation,
                message: "connection refused".to_string(),
            });
        }
        if let Some(expected) = &self.expected_token {
            if expected != bearer {
                return Ok(ApiResponse::new(401, json!({"detail": "Invalid or expired token"})));
            }
        }

        debug!(operation, "Local backend handling request");
        Ok(self.handle(request))
    }
}

fn ok(body: Value) -> ApiResponse {
    ApiResponse::new(200, body)
}

fn not_found(detail: &str) -> ApiResponse {
    ApiResponse::new(404, json!({ "detail": detail }))
}

fn unprocessable() -> ApiResponse {
    ApiResponse::new(422, json!({"detail": "Invalid request body"}))
}

fn parse<T: serde::de::DeserializeOwned>(request: &ApiRequest) -> Option<T> {
    request
        .body
        .clone()
        .and_then(|body| serde_json::from_value(body).ok())
}

/// Deterministic roadmap for `profile`.
fn template_roadmap(profile: &Profile, revision: u32) -> ActiveRoadmap {
    let interest = profile
        .interests
        .first()
        .cloned()
        .unwrap_or_else(|| "Software Development".to_string());
    let skills: Vec<String> = profile.skills.iter().take(3).cloned().collect();
    let gap = format!("{} fundamentals", interest);

    let phases = vec![
        Phase::new("Phase 1: Foundations", "4-6 weeks")
            .with_focus_skills(skills.iter().take(2).cloned())
            .with_outcomes([format!("Solid footing in {}", skills.join(", "))]),
        Phase::new(format!("Phase 2: Core {}", interest), "6-8 weeks")
            .with_focus_skills([gap.clone()])
            .with_outcomes([format!("Working knowledge of {}", interest)]),
        Phase::new("Phase 3: Applied Projects", "6 weeks")
            .with_focus_skills(["project delivery", "testing"])
            .with_outcomes(["Two portfolio projects"]),
        Phase::new("Phase 4: Career Launch", "4 weeks")
            .with_focus_skills(["interviewing", "networking"])
            .with_outcomes(["Job-ready portfolio and resume"]),
    ];

    let total = phases.len();
    ActiveRoadmap {
        career_decision: Some(CareerDecision {
            career: format!("{} Specialist", interest),
            reasoning: Some(match revision {
                0 => format!("Matches interest in {}", interest),
                n => format!("Matches interest in {}; adapted {} time(s)", interest, n),
            }),
            confidence: 75.0,
            skill_match_percentage: (skills.len() as f64 * 20.0).min(100.0),
            market_readiness: 50.0,
            industry_demand: IndustryDemand::Stable,
            key_strengths: skills,
            skill_gaps: vec![gap],
            time_to_job_ready: Some("6 months".to_string()),
            alternatives: Vec::new(),
        }),
        learning_roadmap: Roadmap::new(6, phases),
        progress: Progress::new(total),
        updated_at: None,
    }
}

/// Regenerate while keeping per-index phase status and progress.
fn adapt(current: &ActiveRoadmap, profile: &Profile, revision: u32, now: skillroute_core::Time) -> ActiveRoadmap {
    let mut next = template_roadmap(profile, revision);
    for (i, phase) in next.learning_roadmap.phases.iter_mut().enumerate() {
        if let Some(old) = current.learning_roadmap.phases.get(i) {
            phase.status = old.status;
            phase.completed_at = old.completed_at;
        }
    }
    next.progress = derive_progress(&next.learning_roadmap.phases, &current.progress);
    next.updated_at = Some(now);
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::StaticCredential;
    use crate::gateway::{Payload, RemoteGateway};
    use chrono::{Duration as ChronoDuration, Utc};
    use skillroute_core::{ErrorKind, ManualClock};

    fn profile() -> Profile {
        Profile::new("Ada", "bachelors", ["Python", "SQL"], ["Data Science"], "Data engineer")
    }

    fn gateway(backend: Arc<LocalBackend>) -> RemoteGateway<Arc<LocalBackend>, StaticCredential> {
        RemoteGateway::new(backend, StaticCredential::new("tok"))
    }

    #[tokio::test]
    async fn test_empty_backend_reads_not_found() {
        let gw = gateway(Arc::new(LocalBackend::new()));
        assert_eq!(gw.fetch_profile(None).await.unwrap(), Payload::NotFound);
        assert_eq!(gw.fetch_roadmap(None).await.unwrap(), Payload::NotFound);
    }

    #[tokio::test]
    async fn test_generate_then_complete_phases() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let backend = Arc::new(LocalBackend::with_clock(clock.clone()));
        let gw = gateway(backend.clone());

        let active = gw.generate_roadmap(&profile()).await.unwrap();
        assert_eq!(active.progress.total_phases, 4);
        assert_eq!(active.phases()[0].focus_skills, vec!["Python", "SQL"]);

        gw.update_phase(0, PhaseStatus::Completed).await.unwrap();
        clock.advance(ChronoDuration::days(1));
        gw.update_phase(1, PhaseStatus::Completed).await.unwrap();
        gw.update_phase(1, PhaseStatus::Pending).await.unwrap();

        let stored = backend.stored_roadmap().unwrap();
        assert_eq!(stored.progress.completed_phases, 1);
        assert_eq!(stored.progress.streak_days, 2);
    }

    #[tokio::test]
    async fn test_update_out_of_range_is_server_error() {
        let backend = Arc::new(LocalBackend::new().with_roadmap(template_roadmap(&profile(), 0)));
        let err = gateway(backend).update_phase(9, PhaseStatus::Completed).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
    }

    #[tokio::test]
    async fn test_adapt_preserves_progress() {
        let backend = Arc::new(LocalBackend::new().with_profile(profile()));
        let gw = gateway(backend.clone());
        gw.generate_roadmap(&profile()).await.unwrap();
        gw.update_phase(0, PhaseStatus::Completed).await.unwrap();
        gw.adapt_roadmap().await.unwrap();

        let Payload::Found(active) = gw.fetch_roadmap(None).await.unwrap() else {
            panic!("expected roadmap");
        };
        assert!(active.phases()[0].is_completed());
        assert_eq!(active.progress.completed_phases, 1);
        assert_eq!(active.progress.streak_days, 1);
        let reasoning = active.career_decision.unwrap().reasoning.unwrap();
        assert!(reasoning.contains("adapted 1"));
    }

    #[tokio::test]
    async fn test_adapt_without_roadmap_fails() {
        let err = gateway(Arc::new(LocalBackend::new())).adapt_roadmap().await.unwrap_err();
        assert!(matches!(err, GatewayError::Server { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_wrong_token_is_rejected() {
        let backend = Arc::new(LocalBackend::new().require_token("secret"));
        let err = gateway(backend).fetch_profile(None).await.unwrap_err();
        assert!(matches!(err, GatewayError::Server { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_offline_is_transport_error() {
        let backend = Arc::new(LocalBackend::new());
        backend.set_offline(true);
        let err = gateway(backend.clone()).fetch_roadmap(None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(backend.call_count(Endpoint::FetchRoadmap), 1);
    }

    #[tokio::test]
    async fn test_injected_failure_applies_once() {
        let backend = Arc::new(LocalBackend::new());
        backend.fail_next(Endpoint::FetchProfile, 500);
        let gw = gateway(backend);
        assert!(gw.fetch_profile(None).await.is_err());
        assert!(gw.fetch_profile(None).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_profile_save_is_rejected() {
        let mut p = profile();
        p.goals.clear();
        let err = gateway(Arc::new(LocalBackend::new())).save_profile(&p).await.unwrap_err();
        assert!(matches!(err, GatewayError::Server { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_call_log_keeps_most_recent_calls() {
        let backend = Arc::new(LocalBackend::new());
        let gw = gateway(backend.clone());
        for _ in 0..CALL_LOG_LIMIT {
            gw.fetch_profile(None).await.unwrap();
        }
        for _ in 0..10 {
            gw.fetch_roadmap(None).await.unwrap();
        }

        let calls = backend.calls();
        assert_eq!(calls.len(), CALL_LOG_LIMIT);
        assert_eq!(calls.last(), Some(&Endpoint::FetchRoadmap));
        assert_eq!(backend.call_count(Endpoint::FetchRoadmap), 10);
        assert_eq!(backend.call_count(Endpoint::FetchProfile), CALL_LOG_LIMIT - 10);
    }
}
