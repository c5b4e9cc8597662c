//! Backend endpoints and raw request/response envelopes.

use serde_json::Value;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// DELETE
    Delete,
}

/// Backend operations this client uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `GET /api/students/profile`
    FetchProfile,
    /// `POST /api/students/profile`
    SaveProfile,
    /// `GET /api/career/roadmap`
    FetchRoadmap,
    /// `POST /api/career/roadmap`
    GenerateRoadmap,
    /// `DELETE /api/career/roadmap`
    DeleteRoadmap,
    /// `POST /api/progress/update`
    UpdatePhase,
    /// `POST /api/progress/adapt`
    AdaptRoadmap,
}

impl Endpoint {
    /// HTTP method.
    pub fn method(&self) -> Method {
        match self {
            Endpoint::FetchProfile | Endpoint::FetchRoadmap => Method::Get,
            Endpoint::DeleteRoadmap => Method::Delete,
            Endpoint::SaveProfile
            | Endpoint::GenerateRoadmap
            | Endpoint::UpdatePhase
            | Endpoint::AdaptRoadmap => Method::Post,
        }
    }

    /// Path relative to the API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::FetchProfile | Endpoint::SaveProfile => "/api/students/profile",
            Endpoint::FetchRoadmap | Endpoint::GenerateRoadmap | Endpoint::DeleteRoadmap => {
                "/api/career/roadmap"
            }
            Endpoint::UpdatePhase => "/api/progress/update",
            Endpoint::AdaptRoadmap => "/api/progress/adapt",
        }
    }

    /// Logical operation name used in logs and errors.
    pub fn operation(&self) -> &'static str {
        match self {
            Endpoint::FetchProfile => "fetch_profile",
            Endpoint::SaveProfile => "save_profile",
            Endpoint::FetchRoadmap => "fetch_roadmap",
            Endpoint::GenerateRoadmap => "generate_roadmap",
            Endpoint::DeleteRoadmap => "delete_roadmap",
            Endpoint::UpdatePhase => "update_phase",
            Endpoint::AdaptRoadmap => "adapt_roadmap",
        }
    }

    /// Whether the call only reads.
    pub fn is_read(&self) -> bool {
        self.method() == Method::Get
    }
}

/// A request ready for a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Target
    pub endpoint: Endpoint,
    /// JSON body, if any
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Request without a body.
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint, body: None }
    }

    /// Request with a JSON body.
    pub fn with_body(endpoint: Endpoint, body: Value) -> Self {
        Self {
            endpoint,
            body: Some(body),
        }
    }
}

/// What came back from the server.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status
    pub status: u16,
    /// Parsed JSON body; `Null` when empty, a string when not JSON
    pub body: Value,
}

impl ApiResponse {
    /// Build a response.
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Human-readable error detail from an error body.
    pub fn detail(&self) -> String {
        match &self.body {
            Value::Object(map) => map
                .get("detail")
                .or_else(|| map.get("message"))
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .unwrap_or_else(|| self.body.to_string()),
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Whether the body is the backend's "no data yet" answer.
    ///
    /// The backend answers an empty read with `{"message": "..."}` on a
    /// 200; an empty or `null` body means the same.
    pub fn is_not_found_marker(&self) -> bool {
        match &self.body {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            Value::Object(map) => map.is_empty() || map.contains_key("message"),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_routes() {
        assert_eq!(Endpoint::FetchRoadmap.path(), Endpoint::DeleteRoadmap.path());
        assert_eq!(Endpoint::DeleteRoadmap.method(), Method::Delete);
        assert!(Endpoint::FetchProfile.is_read());
        assert!(!Endpoint::AdaptRoadmap.is_read());
    }

    #[test]
    fn test_not_found_marker() {
        assert!(ApiResponse::new(200, json!({"message": "No profile found"})).is_not_found_marker());
        assert!(ApiResponse::new(200, Value::Null).is_not_found_marker());
        assert!(ApiResponse::new(200, json!({})).is_not_found_marker());
        assert!(!ApiResponse::new(200, json!({"name": "Ada"})).is_not_found_marker());
    }

    #[test]
    fn test_detail_prefers_fastapi_detail() {
        let r = ApiResponse::new(404, json!({"detail": "Roadmap or phase not found"}));
        assert_eq!(r.detail(), "Roadmap or phase not found");
        let r = ApiResponse::new(502, Value::String("Bad Gateway".into()));
        assert_eq!(r.detail(), "Bad Gateway");
    }
}
