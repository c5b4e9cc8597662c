//! Gateway error type.

use std::time::Duration;

use skillroute_core::ErrorKind;

/// Result alias for gateway calls.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors that can occur during a backend call.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Deadline elapsed before a response
    #[error("{operation} timed out after {}ms", after.as_millis())]
    Timeout {
        /// Operation name
        operation: &'static str,
        /// The deadline that elapsed
        after: Duration,
    },

    /// Caller aborted the call
    #[error("{operation} was cancelled")]
    Cancelled {
        /// Operation name
        operation: &'static str,
    },

    /// No response reached us
    #[error("{operation} could not reach the server: {message}")]
    Transport {
        /// Operation name
        operation: &'static str,
        /// Underlying failure
        message: String,
    },

    /// Non-success status
    #[error("{operation} failed with status {status}: {detail}")]
    Server {
        /// Operation name
        operation: &'static str,
        /// HTTP status
        status: u16,
        /// Error detail from the body
        detail: String,
    },

    /// Success status but the body did not decode
    #[error("{operation} returned an unexpected body: {message}")]
    Decode {
        /// Operation name
        operation: &'static str,
        /// Decoder message
        message: String,
    },

    /// The credential provider failed
    #[error("could not obtain credential: {0}")]
    Credential(String),
}

impl GatewayError {
    /// Map onto the shared taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Timeout { .. } => ErrorKind::Timeout,
            GatewayError::Cancelled { .. } => ErrorKind::Cancelled,
            GatewayError::Transport { .. } | GatewayError::Credential(_) => ErrorKind::Transport,
            GatewayError::Server { .. } => ErrorKind::Server,
            GatewayError::Decode { .. } => ErrorKind::Decode,
        }
    }

    /// Whether a later re-invocation could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Timeout { .. } | GatewayError::Transport { .. } => true,
            GatewayError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
