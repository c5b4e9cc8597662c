//! TTL cache implementation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Duration;
use skillroute_core::{Clock, SystemClock, Time, UserId};
use tracing::debug;

/// A cached value with its absolute expiry.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// Cached value
    pub value: V,
    /// When it was written
    pub stored_at: Time,
    /// When it stops being served
    pub expires_at: Time,
}

impl<V> CacheEntry<V> {
    /// Whether the entry may be served at `now`.
    ///
    /// An entry written with a non-positive TTL is never live.
    pub fn is_live(&self, now: Time) -> bool {
        self.expires_at > self.stored_at && now <= self.expires_at
    }
}

/// Cache keys used by the roadmap session.
pub struct CacheKey;

impl CacheKey {
    /// Key for a user's profile.
    pub fn profile(user: &UserId) -> String {
        format!("profile:{}", user)
    }

    /// Key for a user's active roadmap.
    pub fn roadmap(user: &UserId) -> String {
        format!("roadmap:{}", user)
    }
}

/// Key/value store with per-entry expiry.
///
/// Constructed explicitly and shared through `Arc`; there is no global
/// instance.
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache on the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a cache on a custom clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store `value` under `key` until now + `ttl`, replacing any entry.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let now = self.clock.now();
        let entry = CacheEntry {
            value,
            stored_at: now,
            expires_at: now.checked_add_signed(ttl).unwrap_or(Time::MAX_UTC),
        };
        self.entries().insert(key.into(), entry);
    }

    /// Get a live value. A stale entry is removed and reported absent.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.entries();
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Some(entry.value.clone()),
            Some(_) => {
                debug!(key, "Evicting expired cache entry");
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Remove one entry.
    pub fn clear(&self, key: &str) {
        self.entries().remove(key);
    }

    /// Remove every entry.
    pub fn clear_all(&self) {
        self.entries().clear();
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillroute_core::ManualClock;
    use chrono::Utc;

    fn cache() -> (Arc<ManualClock>, TtlCache<String>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = TtlCache::with_clock(clock.clone());
        (clock, cache)
    }

    #[test]
    fn test_zero_ttl_is_absent_immediately() {
        let (_clock, cache) = cache();
        cache.set("k", "v".to_string(), Duration::zero());
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_negative_ttl_is_not_infinite() {
        let (_clock, cache) = cache();
        cache.set("k", "v".to_string(), Duration::seconds(-30));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_value_served_until_expiry_then_evicted() {
        let (clock, cache) = cache();
        cache.set("k", "v".to_string(), Duration::minutes(5));

        clock.advance(Duration::minutes(4));
        assert_eq!(cache.get("k").as_deref(), Some("v"));

        clock.advance(Duration::minutes(1));
        assert_eq!(cache.get("k").as_deref(), Some("v"));

        clock.advance(Duration::milliseconds(1));
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_huge_ttl_saturates_instead_of_overflowing() {
        let (clock, cache) = cache();
        cache.set("k", "v".to_string(), Duration::days(365 * 300_000));
        assert_eq!(cache.get("k").as_deref(), Some("v"));

        clock.advance(Duration::days(365 * 1000));
        assert_eq!(cache.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_set_overwrites_and_resets_expiry() {
        let (clock, cache) = cache();
        cache.set("k", "old".to_string(), Duration::minutes(1));
        clock.advance(Duration::seconds(50));
        cache.set("k", "new".to_string(), Duration::minutes(1));
        clock.advance(Duration::seconds(50));
        assert_eq!(cache.get("k").as_deref(), Some("new"));
    }

    #[test]
    fn test_stale_entries_linger_until_read() {
        let (clock, cache) = cache();
        cache.set("a", "1".to_string(), Duration::seconds(1));
        cache.set("b", "2".to_string(), Duration::seconds(1));
        clock.advance(Duration::seconds(5));
        assert_eq!(cache.len(), 2);
        cache.get("a");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_and_clear_all() {
        let (_clock, cache) = cache();
        cache.set("a", "1".to_string(), Duration::minutes(5));
        cache.set("b", "2".to_string(), Duration::minutes(5));
        cache.clear("a");
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b").as_deref(), Some("2"));
        cache.clear_all();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_keys_are_namespaced_by_user() {
        let user = UserId::new("u1");
        assert_eq!(CacheKey::profile(&user), "profile:u1");
        assert_ne!(CacheKey::profile(&user), CacheKey::roadmap(&user));
    }
}
