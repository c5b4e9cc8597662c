//! Short-lived cache for profile and roadmap reads.
//!
//! Entries expire after a fixed TTL and are evicted lazily on read; there
//! is no background sweep and no size bound.

#![warn(missing_docs)]

pub mod ttl;

pub use skillroute_core::{Clock, ManualClock, SystemClock};
pub use ttl::{CacheEntry, CacheKey, TtlCache};
