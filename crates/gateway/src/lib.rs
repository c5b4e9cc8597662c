//! Remote Gateway
//!
//! Typed access to the SkillRoute backend. Every call fetches a fresh
//! bearer credential, runs under a deadline, can be cancelled, and maps
//! failures onto [`skillroute_core::ErrorKind`].

#![warn(missing_docs)]

pub mod endpoint;
pub mod error;
pub mod credential;
pub mod cancel;
pub mod transport;
pub mod gateway;
pub mod local;

pub use endpoint::{ApiRequest, ApiResponse, Endpoint, Method};
pub use error::{GatewayError, Result};
pub use credential::{CredentialProvider, StaticCredential};
pub use cancel::CancelToken;
pub use transport::{HttpTransport, Transport};
pub use gateway::{CallPolicy, Payload, RemoteGateway};
pub use local::{LocalBackend, CALL_LOG_LIMIT};
