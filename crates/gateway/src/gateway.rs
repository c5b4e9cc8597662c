//! Typed gateway over a [`Transport`].

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use skillroute_core::{ActiveRoadmap, PhaseStatus, Profile};
use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::credential::CredentialProvider;
use crate::endpoint::{ApiRequest, ApiResponse, Endpoint};
use crate::error::{GatewayError, Result};
use crate::transport::Transport;

/// Deadlines applied to calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPolicy {
    /// Deadline for reads
    pub read_timeout: Duration,
    /// Deadline for mutations
    pub write_timeout: Duration,
}

impl CallPolicy {
    /// Deadline for `endpoint`.
    pub fn timeout_for(&self, endpoint: Endpoint) -> Duration {
        if endpoint.is_read() {
            self.read_timeout
        } else {
            self.write_timeout
        }
    }
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(8),
            write_timeout: Duration::from_secs(60),
        }
    }
}

/// Result of a read that may legitimately find nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<T> {
    /// Data present
    Found(T),
    /// Server says there is no data yet
    NotFound,
}

impl<T> Payload<T> {
    /// Convert into an `Option`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Payload::Found(v) => Some(v),
            Payload::NotFound => None,
        }
    }
}

/// Typed, deadline-bound access to the backend.
///
/// Does not retry; callers decide whether to re-invoke.
pub struct RemoteGateway<T, C> {
    transport: T,
    credentials: C,
    policy: CallPolicy,
}

impl<T: Transport, C: CredentialProvider> RemoteGateway<T, C> {
    /// Create a gateway with the default policy.
    pub fn new(transport: T, credentials: C) -> Self {
        Self::with_policy(transport, credentials, CallPolicy::default())
    }

    /// Create a gateway with a custom policy.
    pub fn with_policy(transport: T, credentials: C, policy: CallPolicy) -> Self {
        Self {
            transport,
            credentials,
            policy,
        }
    }

    /// Active policy.
    pub fn policy(&self) -> CallPolicy {
        self.policy
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run one call under its deadline and optional cancel token.
    ///
    /// Returns the response only for 2xx statuses. Dropping the in-flight
    /// exchange on timeout or cancellation aborts the request.
    pub async fn call(&self, request: ApiRequest, cancel: Option<&CancelToken>) -> Result<ApiResponse> {
        let endpoint = request.endpoint;
        let operation = endpoint.operation();
        let limit = self.policy.timeout_for(endpoint);

        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(GatewayError::Cancelled { operation });
        }

        let exchange = async {
            // fresh credential per call, never reused
            let token = self.credentials.bearer_token().await?;
            self.transport.send(&request, &token).await
        };
        let deadline = tokio::time::timeout(limit, exchange);

        debug!(operation, timeout_ms = limit.as_millis() as u64, "Calling backend");

        let outcome = match cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!(operation, "Call cancelled by caller");
                        return Err(GatewayError::Cancelled { operation });
                    }
                    outcome = deadline => outcome,
                }
            }
            None => deadline.await,
        };

        let response = match outcome {
            Ok(result) => result?,
            Err(_) => {
                warn!(operation, timeout_ms = limit.as_millis() as u64, "Call timed out");
                return Err(GatewayError::Timeout { operation, after: limit });
            }
        };

        if !response.is_success() {
            return Err(GatewayError::Server {
                operation,
                status: response.status,
                detail: response.detail(),
            });
        }
        Ok(response)
    }

    async fn read<R: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        cancel: Option<&CancelToken>,
    ) -> Result<Payload<R>> {
        let response = self.call(ApiRequest::new(endpoint), cancel).await?;
        if response.is_not_found_marker() {
            debug!(operation = endpoint.operation(), "No data yet");
            return Ok(Payload::NotFound);
        }
        decode(endpoint, response.body).map(Payload::Found)
    }

    /// `GET /api/students/profile`
    pub async fn fetch_profile(&self, cancel: Option<&CancelToken>) -> Result<Payload<Profile>> {
        self.read(Endpoint::FetchProfile, cancel).await
    }

    /// `GET /api/career/roadmap`
    pub async fn fetch_roadmap(&self, cancel: Option<&CancelToken>) -> Result<Payload<ActiveRoadmap>> {
        self.read(Endpoint::FetchRoadmap, cancel).await
    }

    /// `POST /api/students/profile`; returns the stored profile.
    pub async fn save_profile(&self, profile: &Profile) -> Result<Profile> {
        let endpoint = Endpoint::SaveProfile;
        let body = encode(endpoint, profile)?;
        let response = self.call(ApiRequest::with_body(endpoint, body), None).await?;
        match response.body.get("profile") {
            Some(stored) => decode(endpoint, stored.clone()),
            None => Ok(profile.clone()),
        }
    }

    /// `POST /api/career/roadmap`; returns the freshly generated roadmap.
    pub async fn generate_roadmap(&self, profile: &Profile) -> Result<ActiveRoadmap> {
        let endpoint = Endpoint::GenerateRoadmap;
        let body = encode(endpoint, profile)?;
        let response = self.call(ApiRequest::with_body(endpoint, body), None).await?;
        decode(endpoint, response.body)
    }

    /// `DELETE /api/career/roadmap`. Any 2xx counts as done, body ignored.
    pub async fn delete_roadmap(&self) -> Result<()> {
        self.call(ApiRequest::new(Endpoint::DeleteRoadmap), None).await?;
        Ok(())
    }

    /// `POST /api/progress/update`. The acknowledgement carries no state.
    pub async fn update_phase(&self, phase_index: usize, status: PhaseStatus) -> Result<()> {
        let body = json!({ "phase_index": phase_index, "status": status });
        self.call(ApiRequest::with_body(Endpoint::UpdatePhase, body), None).await?;
        Ok(())
    }

    /// `POST /api/progress/adapt`. The caller re-fetches the roadmap.
    pub async fn adapt_roadmap(&self) -> Result<()> {
        self.call(ApiRequest::with_body(Endpoint::AdaptRoadmap, json!({})), None).await?;
        Ok(())
    }
}

fn encode<S: serde::Serialize>(endpoint: Endpoint, value: &S) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| GatewayError::Decode {
        operation: endpoint.operation(),
        message: e.to_string(),
    })
}

fn decode<R: DeserializeOwned>(endpoint: Endpoint, body: Value) -> Result<R> {
    serde_json::from_value(body).map_err(|e| GatewayError::Decode {
        operation: endpoint.operation(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::StaticCredential;
    use crate::transport::HttpTransport;
    use async_trait::async_trait;
    use skillroute_core::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(server: &MockServer) -> RemoteGateway<HttpTransport, StaticCredential> {
        RemoteGateway::new(HttpTransport::new(server.uri()), StaticCredential::new("tok"))
    }

    fn roadmap_body() -> Value {
        json!({
            "career_decision": {"career": "Backend Developer", "confidence": 80},
            "learning_roadmap": {
                "duration_months": 6,
                "roadmap": [
                    {"phase": "Phase 1: Foundations", "duration": "4 weeks", "status": "completed"},
                    {"phase": "Phase 2: APIs", "duration": "6 weeks", "status": "pending"}
                ]
            },
            "progress": {"completed_phases": 1, "total_phases": 2, "streak_days": 1,
                         "last_activity_date": "2024-05-01T08:00:00.000000"}
        })
    }

    #[tokio::test]
    async fn test_fetch_roadmap_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/career/roadmap"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(roadmap_body()))
            .mount(&server)
            .await;

        let payload = gateway(&server).fetch_roadmap(None).await.unwrap();
        let Payload::Found(active) = payload else {
            panic!("expected roadmap");
        };
        assert_eq!(active.phases().len(), 2);
        assert_eq!(active.progress.streak_days, 1);
    }

    #[tokio::test]
    async fn test_message_marker_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/students/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "No profile found"})))
            .mount(&server)
            .await;

        let payload = gateway(&server).fetch_profile(None).await.unwrap();
        assert_eq!(payload, Payload::NotFound);
    }

    #[tokio::test]
    async fn test_server_error_carries_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/progress/adapt"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "No active roadmap found"})))
            .mount(&server)
            .await;

        let err = gateway(&server).adapt_roadmap().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
        assert!(matches!(err, GatewayError::Server { status: 404, ref detail, .. } if detail == "No active roadmap found"));
    }

    #[tokio::test]
    async fn test_slow_read_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/career/roadmap"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(roadmap_body())
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let policy = CallPolicy {
            read_timeout: Duration::from_millis(50),
            write_timeout: Duration::from_secs(5),
        };
        let gateway = RemoteGateway::with_policy(
            HttpTransport::new(server.uri()),
            StaticCredential::new("tok"),
            policy,
        );
        let err = gateway.fetch_roadmap(None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_cancel_aborts_read() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/career/roadmap"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let gateway = gateway(&server);
        let token = CancelToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });
        let err = gateway.fetch_roadmap(Some(&token)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn test_delete_ignores_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/career/roadmap"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "deleted"})))
            .expect(1)
            .mount(&server)
            .await;

        gateway(&server).delete_roadmap().await.unwrap();
    }

    #[tokio::test]
    async fn test_bad_roadmap_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/career/roadmap"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"learning_roadmap": 7})))
            .mount(&server)
            .await;

        let err = gateway(&server).fetch_roadmap(None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    struct CountingCredential(AtomicUsize);

    #[async_trait]
    impl CredentialProvider for CountingCredential {
        async fn bearer_token(&self) -> Result<String> {
            let n = self.0.fetch_add(1, Ordering::SeqCst);
            Ok(format!("tok-{n}"))
        }
    }

    #[tokio::test]
    async fn test_credential_fetched_per_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/students/profile"))
            .and(header("authorization", "Bearer tok-0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "none"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/students/profile"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "none"})))
            .expect(1)
            .mount(&server)
            .await;

        let credentials = Arc::new(CountingCredential(AtomicUsize::new(0)));
        let gateway = RemoteGateway::new(HttpTransport::new(server.uri()), credentials.clone());
        gateway.fetch_profile(None).await.unwrap();
        gateway.fetch_profile(None).await.unwrap();
        assert_eq!(credentials.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_save_profile_returns_stored_profile() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/students/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "message": "Profile saved successfully",
                "profile": {"name": "Ada", "education": "masters", "skills": "Rust, Go",
                            "interests": "Systems", "goals": "SRE", "experience": ""}
            })))
            .mount(&server)
            .await;

        let profile = Profile::new("Ada", "masters", ["Rust", "Go"], ["Systems"], "SRE");
        let stored = gateway(&server).save_profile(&profile).await.unwrap();
        assert_eq!(stored, profile);
    }
}
