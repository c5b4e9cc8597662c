//! Timestamp helpers for wire payloads.
//!
//! The backend writes naive UTC ISO-8601 strings (no offset) while the
//! local backend writes RFC 3339. Both decode to [`Time`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::Time;

/// Parse an RFC 3339 timestamp, a naive ISO-8601 datetime (taken as UTC)
/// or a bare date (midnight UTC).
pub fn parse_lenient(raw: &str) -> Option<Time> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = raw.parse::<NaiveDateTime>() {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `serde(with = ...)` adapter for optional timestamps.
pub mod option {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::Time;

    /// Serialize as RFC 3339 or `null`.
    pub fn serialize<S: Serializer>(value: &Option<Time>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(t) => serializer.serialize_some(&t.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize leniently; blank strings decode to `None`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Time>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => super::parse_lenient(&s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_naive_backend_timestamp() {
        let t = parse_lenient("2024-05-01T12:30:00.123456").unwrap();
        assert_eq!(t.day(), 1);
        assert_eq!(t.hour(), 12);
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let t = parse_lenient("2024-05-01T23:30:00-02:00").unwrap();
        assert_eq!(t.day(), 2);
        assert_eq!(t.hour(), 1);
    }

    #[test]
    fn test_parse_bare_date() {
        let t = parse_lenient("2024-05-01").unwrap();
        assert_eq!(t.hour(), 0);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_lenient("yesterday").is_none());
    }
}
