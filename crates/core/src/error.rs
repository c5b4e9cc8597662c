//! Error-kind taxonomy shared by every layer.

use serde::{Deserialize, Serialize};

/// Classification of an operation failure.
///
/// Layers keep their own error types; this is the common vocabulary the
/// roadmap session uses to decide what the user sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Call aborted locally because its deadline elapsed.
    Timeout,
    /// Call aborted locally at the caller's request.
    Cancelled,
    /// No response reached us (offline, connection refused).
    Transport,
    /// A response arrived with a non-success status.
    Server,
    /// A success response whose body did not match the contract.
    Decode,
    /// Operation invoked without the local state it needs.
    Precondition,
    /// Explicit "no data yet" answer. Not a failure.
    NotFound,
}

impl ErrorKind {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Transport => "transport",
            ErrorKind::Server => "server",
            ErrorKind::Decode => "decode",
            ErrorKind::Precondition => "precondition",
            ErrorKind::NotFound => "not_found",
        }
    }

    /// Whether this kind represents an actual failure.
    pub fn is_failure(&self) -> bool {
        !matches!(self, ErrorKind::NotFound)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
