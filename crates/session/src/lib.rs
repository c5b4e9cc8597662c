//! Roadmap session: the state machine presentation drives.
//!
//! A [`RoadmapSession`] owns the in-memory profile and roadmap snapshot,
//! reads through a [`TtlCache`](skillroute_cache::TtlCache), calls the
//! backend through a [`RemoteGateway`](skillroute_gateway::RemoteGateway)
//! and reports every mutation outcome to a [`NotificationSink`].

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod notify;
pub mod session;

pub use config::{ConfigError, SessionConfig};
pub use error::SessionError;
pub use notify::{Notification, NotificationKind, NotificationMessage, NotificationSink};
pub use session::{CachedValue, LoadOutcome, Outcome, RoadmapSession, RoadmapState, Snapshot};
