//! Roadmap state machine.
//!
//! The session is the only owner of the live profile and roadmap
//! snapshot. Presentation issues commands and reads [`Snapshot`]s.
//!
//! Each resource (profile, roadmap) has a lane:
//! - a busy flag that admits one mutation at a time; a second one is
//!   rejected with an info notification,
//! - a read/write lock so reads never overlap a mutation of the same
//!   resource,
//! - an epoch bumped whenever a mutation or sign-out replaces the
//!   snapshot; a read only applies its result if the epoch it started
//!   with is still current.
//!
//! Only [`SessionError`] rejections reach the caller. Gateway failures on
//! mutations become one error notification; on reads they are logged.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Duration;
use skillroute_cache::{CacheKey, TtlCache};
use skillroute_core::{ActiveRoadmap, ErrorKind, PhaseStatus, Profile, Time, UserId};
use skillroute_gateway::{
    CancelToken, CredentialProvider, GatewayError, Payload, RemoteGateway, Transport,
};
use skillroute_progress::{recommend, reconcile, ProgressReport, Recommendation};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::notify::{NotificationKind, NotificationMessage, NotificationSink};

/// Values kept in the session cache.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    /// Stored profile
    Profile(Profile),
    /// Active roadmap
    Roadmap(ActiveRoadmap),
}

/// Roadmap half of the snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RoadmapState {
    /// No roadmap
    #[default]
    Empty,
    /// Roadmap with reconciled progress
    Loaded(ActiveRoadmap),
}

impl RoadmapState {
    /// The loaded roadmap, if any.
    pub fn active(&self) -> Option<&ActiveRoadmap> {
        match self {
            RoadmapState::Loaded(active) => Some(active),
            RoadmapState::Empty => None,
        }
    }

    /// Whether a roadmap is loaded.
    pub fn is_loaded(&self) -> bool {
        matches!(self, RoadmapState::Loaded(_))
    }
}

/// Point-in-time view for presentation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    /// Loaded profile
    pub profile: Option<Profile>,
    /// Roadmap state
    pub roadmap: RoadmapState,
    /// A profile call is in flight
    pub profile_loading: bool,
    /// A roadmap call is in flight
    pub roadmap_loading: bool,
    /// A profile mutation holds the lane
    pub profile_busy: bool,
    /// A roadmap mutation holds the lane
    pub roadmap_busy: bool,
}

/// How a read ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Served from cache
    Cached,
    /// Fetched and applied
    Fetched,
    /// Backend has nothing; state left as it was
    Empty,
    /// Read failed; state untouched
    Failed(ErrorKind),
    /// Result arrived after the snapshot moved on and was dropped
    Discarded,
}

/// How a mutation ended. The matching notification is already queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Backend confirmed the change
    Completed,
    /// Backend call failed; state untouched
    Failed(ErrorKind),
    /// Another mutation of the same resource was in flight
    Rejected,
}

#[derive(Debug, Default)]
struct State {
    profile: Option<Profile>,
    roadmap: RoadmapState,
    profile_epoch: u64,
    roadmap_epoch: u64,
}

#[derive(Debug, Default)]
struct Lane {
    busy: AtomicBool,
    loading: AtomicUsize,
    lock: RwLock<()>,
}

/// Clears the busy flag on every exit path.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Counts an in-flight call for the loading flag.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Profile and roadmap orchestration for one user.
pub struct RoadmapSession<T, C> {
    gateway: RemoteGateway<T, C>,
    cache: Arc<TtlCache<CachedValue>>,
    notifications: Arc<NotificationSink>,
    user: UserId,
    cache_ttl: Duration,
    state: Mutex<State>,
    profile_lane: Lane,
    roadmap_lane: Lane,
}

impl<T: Transport, C: CredentialProvider> RoadmapSession<T, C> {
    /// Create a session. Cached reads live for five minutes.
    pub fn new(
        gateway: RemoteGateway<T, C>,
        cache: Arc<TtlCache<CachedValue>>,
        notifications: Arc<NotificationSink>,
        user: UserId,
    ) -> Self {
        Self {
            gateway,
            cache,
            notifications,
            user,
            cache_ttl: Duration::minutes(5),
            state: Mutex::new(State::default()),
            profile_lane: Lane::default(),
            roadmap_lane: Lane::default(),
        }
    }

    /// Override the cache lifetime.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Notification queue shared with presentation.
    pub fn notifications(&self) -> &NotificationSink {
        &self.notifications
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        let state = self.state();
        Snapshot {
            profile: state.profile.clone(),
            roadmap: state.roadmap.clone(),
            profile_loading: self.profile_lane.loading.load(Ordering::Acquire) > 0,
            roadmap_loading: self.roadmap_lane.loading.load(Ordering::Acquire) > 0,
            profile_busy: self.profile_lane.busy.load(Ordering::Acquire),
            roadmap_busy: self.roadmap_lane.busy.load(Ordering::Acquire),
        }
    }

    /// Progress report for the loaded roadmap.
    pub fn progress_report(&self, now: Time) -> Option<ProgressReport> {
        self.state()
            .roadmap
            .active()
            .map(|active| ProgressReport::build(active, now))
    }

    /// Recommendations for the loaded roadmap; empty when none is loaded.
    pub fn recommendations(&self) -> Vec<Recommendation> {
        self.state()
            .roadmap
            .active()
            .map(|active| recommend(&active.progress, active.phases()))
            .unwrap_or_default()
    }

    /// Load the profile, through the cache.
    pub async fn load_profile(&self, cancel: Option<&CancelToken>) -> LoadOutcome {
        let _read = self.profile_lane.lock.read().await;
        let _loading = LoadingGuard::enter(&self.profile_lane.loading);

        let key = CacheKey::profile(&self.user);
        if let Some(CachedValue::Profile(profile)) = self.cache.get(&key) {
            debug!(user = %self.user, "Profile cache hit");
            self.state().profile = Some(profile);
            return LoadOutcome::Cached;
        }

        debug!(user = %self.user, "Profile cache miss");
        let epoch = self.state().profile_epoch;
        let result = self.gateway.fetch_profile(cancel).await;

        let mut state = self.state();
        if state.profile_epoch != epoch {
            debug!(user = %self.user, "Discarding stale profile response");
            return LoadOutcome::Discarded;
        }
        match result {
            Ok(Payload::Found(profile)) => {
                self.cache.set(key, CachedValue::Profile(profile.clone()), self.cache_ttl);
                state.profile = Some(profile);
                LoadOutcome::Fetched
            }
            Ok(Payload::NotFound) => LoadOutcome::Empty,
            Err(e) => {
                warn!(operation = "load_profile", error = %e, "Profile load failed");
                LoadOutcome::Failed(e.kind())
            }
        }
    }

    /// Load the roadmap, through the cache.
    pub async fn load_roadmap(&self, cancel: Option<&CancelToken>) -> LoadOutcome {
        let _read = self.roadmap_lane.lock.read().await;
        let _loading = LoadingGuard::enter(&self.roadmap_lane.loading);

        if let Some(CachedValue::Roadmap(active)) = self.cache.get(&CacheKey::roadmap(&self.user)) {
            debug!(user = %self.user, "Roadmap cache hit");
            self.state().roadmap = RoadmapState::Loaded(active);
            return LoadOutcome::Cached;
        }

        debug!(user = %self.user, "Roadmap cache miss");
        self.fetch_roadmap(cancel).await
    }

    /// Generate a roadmap for `profile`, replacing the current one.
    ///
    /// Fails with [`SessionError::IncompleteProfile`] before any network
    /// call when the profile has no skills or interests.
    pub async fn generate(&self, profile: &Profile) -> Result<Outcome, SessionError> {
        profile.ensure_roadmap_ready()?;
        let Some(_busy) = self.begin(&self.roadmap_lane, "generate") else {
            return Ok(Outcome::Rejected);
        };
        let _write = self.roadmap_lane.lock.write().await;
        let _loading = LoadingGuard::enter(&self.roadmap_lane.loading);

        info!(user = %self.user, "Generating roadmap");
        match self.gateway.generate_roadmap(profile).await {
            Ok(mut active) => {
                reconcile(&mut active);
                let description = match &active.career_decision {
                    Some(decision) => format!("Your path to {} is ready", decision.career),
                    None => "Your learning path is ready".to_string(),
                };
                self.cache.clear(&CacheKey::roadmap(&self.user));
                {
                    let mut state = self.state();
                    state.roadmap_epoch += 1;
                    state.roadmap = RoadmapState::Loaded(active);
                }
                self.succeed(NotificationMessage::detailed("Roadmap generated", description));
                Ok(Outcome::Completed)
            }
            Err(e) => Ok(self.fail("generate", "Could not generate roadmap", e)),
        }
    }

    /// Generate from the loaded profile.
    pub async fn generate_loaded(&self) -> Result<Outcome, SessionError> {
        let profile = self.state().profile.clone().ok_or(SessionError::MissingProfile)?;
        self.generate(&profile).await
    }

    /// Flip phase `index` away from `current` and reload from the backend.
    ///
    /// The snapshot only changes after the backend confirms.
    pub async fn toggle_phase(&self, index: usize, current: PhaseStatus) -> Result<Outcome, SessionError> {
        self.check_phase(index)?;
        let Some(_busy) = self.begin(&self.roadmap_lane, "toggle_phase") else {
            return Ok(Outcome::Rejected);
        };
        let _write = self.roadmap_lane.lock.write().await;
        let _loading = LoadingGuard::enter(&self.roadmap_lane.loading);

        let next = current.toggled();
        info!(user = %self.user, index, status = %next, "Updating phase");
        match self.gateway.update_phase(index, next).await {
            Ok(()) => {
                self.invalidate_roadmap();
                self.fetch_roadmap(None).await;
                self.succeed(format!("Phase {} marked as {}", index + 1, next));
                Ok(Outcome::Completed)
            }
            Err(e) => Ok(self.fail("toggle_phase", "Could not update progress", e)),
        }
    }

    /// Ask the backend to adapt the roadmap to current progress, then reload.
    pub async fn adapt(&self) -> Result<Outcome, SessionError> {
        if !self.state().roadmap.is_loaded() {
            return Err(SessionError::NoRoadmap);
        }
        let Some(_busy) = self.begin(&self.roadmap_lane, "adapt") else {
            return Ok(Outcome::Rejected);
        };
        let _write = self.roadmap_lane.lock.write().await;
        let _loading = LoadingGuard::enter(&self.roadmap_lane.loading);

        info!(user = %self.user, "Adapting roadmap");
        match self.gateway.adapt_roadmap().await {
            Ok(()) => {
                self.invalidate_roadmap();
                self.fetch_roadmap(None).await;
                self.succeed(NotificationMessage::detailed(
                    "Roadmap adapted",
                    "Your roadmap now reflects your progress",
                ));
                Ok(Outcome::Completed)
            }
            Err(e) => Ok(self.fail("adapt", "Could not adapt roadmap", e)),
        }
    }

    /// Delete the roadmap on the backend and clear it locally.
    pub async fn reset(&self) -> Result<Outcome, SessionError> {
        let Some(_busy) = self.begin(&self.roadmap_lane, "reset") else {
            return Ok(Outcome::Rejected);
        };
        let _write = self.roadmap_lane.lock.write().await;
        let _loading = LoadingGuard::enter(&self.roadmap_lane.loading);

        info!(user = %self.user, "Resetting roadmap");
        match self.gateway.delete_roadmap().await {
            Ok(()) => {
                self.invalidate_roadmap();
                self.state().roadmap = RoadmapState::Empty;
                self.succeed("Roadmap reset");
                Ok(Outcome::Completed)
            }
            Err(e) => Ok(self.fail("reset", "Could not reset roadmap", e)),
        }
    }

    /// Store `profile` on the backend.
    pub async fn save_profile(&self, profile: &Profile) -> Result<Outcome, SessionError> {
        profile.validate()?;
        let Some(_busy) = self.begin(&self.profile_lane, "save_profile") else {
            return Ok(Outcome::Rejected);
        };
        let _write = self.profile_lane.lock.write().await;
        let _loading = LoadingGuard::enter(&self.profile_lane.loading);

        info!(user = %self.user, "Saving profile");
        match self.gateway.save_profile(profile).await {
            Ok(stored) => {
                self.cache.clear(&CacheKey::profile(&self.user));
                {
                    let mut state = self.state();
                    state.profile_epoch += 1;
                    state.profile = Some(stored);
                }
                self.succeed("Profile saved");
                Ok(Outcome::Completed)
            }
            Err(e) => Ok(self.fail("save_profile", "Could not save profile", e)),
        }
    }

    /// Drop the snapshot and this user's cache entries.
    ///
    /// Reads still in flight finish as [`LoadOutcome::Discarded`].
    pub fn sign_out(&self) {
        self.cache.clear(&CacheKey::profile(&self.user));
        self.cache.clear(&CacheKey::roadmap(&self.user));
        let mut state = self.state();
        state.profile_epoch += 1;
        state.roadmap_epoch += 1;
        state.profile = None;
        state.roadmap = RoadmapState::Empty;
        info!(user = %self.user, "Signed out");
    }

    /// Fetch the roadmap bypassing the cache and apply it if still current.
    async fn fetch_roadmap(&self, cancel: Option<&CancelToken>) -> LoadOutcome {
        let epoch = self.state().roadmap_epoch;
        let result = self.gateway.fetch_roadmap(cancel).await;

        let mut state = self.state();
        if state.roadmap_epoch != epoch {
            debug!(user = %self.user, "Discarding stale roadmap response");
            return LoadOutcome::Discarded;
        }
        match result {
            Ok(Payload::Found(mut active)) => {
                if reconcile(&mut active) {
                    debug!(user = %self.user, "Reconciled progress counters");
                }
                self.cache.set(
                    CacheKey::roadmap(&self.user),
                    CachedValue::Roadmap(active.clone()),
                    self.cache_ttl,
                );
                state.roadmap = RoadmapState::Loaded(active);
                LoadOutcome::Fetched
            }
            Ok(Payload::NotFound) => LoadOutcome::Empty,
            Err(e) => {
                warn!(operation = "load_roadmap", error = %e, "Roadmap load failed");
                LoadOutcome::Failed(e.kind())
            }
        }
    }

    fn check_phase(&self, index: usize) -> Result<(), SessionError> {
        let state = self.state();
        let active = state.roadmap.active().ok_or(SessionError::NoRoadmap)?;
        let total = active.phases().len();
        if index >= total {
            return Err(SessionError::PhaseOutOfRange { index, total });
        }
        Ok(())
    }

    fn begin<'a>(&self, lane: &'a Lane, operation: &'static str) -> Option<BusyGuard<'a>> {
        if lane
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!(operation, "Rejected: another update is in flight");
            self.notifications
                .push(NotificationKind::Info, "Another update is still in progress");
            return None;
        }
        Some(BusyGuard(&lane.busy))
    }

    fn invalidate_roadmap(&self) {
        self.cache.clear(&CacheKey::roadmap(&self.user));
        self.state().roadmap_epoch += 1;
    }

    fn succeed(&self, message: impl Into<NotificationMessage>) {
        self.notifications.push(NotificationKind::Success, message);
    }

    fn fail(&self, operation: &'static str, title: &str, error: GatewayError) -> Outcome {
        warn!(operation, error = %error, "Operation failed");
        self.notifications.push(
            NotificationKind::Error,
            NotificationMessage::detailed(title, describe(&error)),
        );
        Outcome::Failed(error.kind())
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// User-facing explanation of a gateway failure.
fn describe(error: &GatewayError) -> String {
    match error {
        GatewayError::Timeout { .. } => "The server took too long to respond. Please try again.".to_string(),
        GatewayError::Cancelled { .. } => "The request was cancelled.".to_string(),
        GatewayError::Server { detail, .. } if !detail.is_empty() => detail.clone(),
        GatewayError::Server { status, .. } => format!("The server answered with status {}", status),
        GatewayError::Decode { .. } => "The server sent an unexpected response.".to_string(),
        GatewayError::Transport { .. } | GatewayError::Credential(_) => {
            "Could not reach the server. Check your connection.".to_string()
        }
    }
}
