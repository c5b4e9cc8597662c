//! Transport seam and the HTTP implementation.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use tracing::debug;

use crate::endpoint::{ApiRequest, ApiResponse, Method};
use crate::error::{GatewayError, Result};

/// Moves one request to the backend and returns whatever came back.
///
/// Implementations report a response for every status; only a failure to
/// get any response is an error. Deadlines are enforced by the gateway.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` authenticated with `bearer`.
    async fn send(&self, request: &ApiRequest, bearer: &str) -> Result<ApiResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, request: &ApiRequest, bearer: &str) -> Result<ApiResponse> {
        (**self).send(request, bearer).await
    }
}

/// `reqwest`-backed transport.
#[derive(Clone)]
pub struct HttpTransport {
    /// HTTP client
    client: Client,

    /// API base URL, without trailing slash
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(
            ClientBuilder::new().build().unwrap_or_default(),
            base_url,
        )
    }

    /// Create a transport around an existing client.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest, bearer: &str) -> Result<ApiResponse> {
        let operation = request.endpoint.operation();
        let url = format!("{}{}", self.base_url, request.endpoint.path());

        let builder = match request.endpoint.method() {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Delete => self.client.delete(&url),
        };
        let builder = builder.bearer_auth(bearer);
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        debug!(operation, %url, "Sending request");

        let response = builder.send().await.map_err(|e| GatewayError::Transport {
            operation,
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| GatewayError::Transport {
            operation,
            message: e.to_string(),
        })?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        debug!(operation, status, "Received response");
        Ok(ApiResponse::new(status, body))
    }
}
