//! Bearer credential source.

use async_trait::async_trait;

use crate::error::Result;

/// Issues a bearer token for a single call.
///
/// The gateway asks for a token on every call and never keeps one;
/// implementations refresh short-lived tokens as they see fit.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// A token valid for the next request.
    async fn bearer_token(&self) -> Result<String>;
}

/// Fixed token, for the CLI and tests.
#[derive(Debug, Clone)]
pub struct StaticCredential(String);

impl StaticCredential {
    /// Wrap a token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl CredentialProvider for StaticCredential {
    async fn bearer_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

#[async_trait]
impl<C: CredentialProvider + ?Sized> CredentialProvider for std::sync::Arc<C> {
    async fn bearer_token(&self) -> Result<String> {
        (**self).bearer_token().await
    }
}
