//! Session configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use skillroute_core::UserId;
use skillroute_gateway::CallPolicy;

/// Longest accepted cache lifetime: one year.
pub const MAX_CACHE_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Cannot read config {path}: {source}")]
    Io {
        /// Offending file
        path: PathBuf,
        /// Cause
        source: std::io::Error,
    },

    /// File is not valid JSON for this schema
    #[error("Invalid config {path}: {source}")]
    Parse {
        /// Offending file
        path: PathBuf,
        /// Cause
        source: serde_json::Error,
    },

    /// A value is out of range
    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        /// Field name
        field: &'static str,
        /// What is wrong with it
        reason: &'static str,
    },
}

/// Settings for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Backend base URL
    pub api_url: String,

    /// Deadline for reads, in seconds
    pub read_timeout_secs: u64,

    /// Deadline for mutations, in seconds
    pub write_timeout_secs: u64,

    /// Lifetime of cached reads, in seconds
    pub cache_ttl_secs: u64,

    /// Cache key namespace
    pub user_id: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            read_timeout_secs: 8,
            write_timeout_secs: 60,
            cache_ttl_secs: 300,
            user_id: "default".to_string(),
        }
    }
}

impl SessionConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Reject values the session cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "api_url",
                reason: "must not be empty",
            });
        }
        if self.read_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "read_timeout_secs",
                reason: "must be positive",
            });
        }
        if self.write_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "write_timeout_secs",
                reason: "must be positive",
            });
        }
        if self.cache_ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(ConfigError::Invalid {
                field: "cache_ttl_secs",
                reason: "must be at most one year",
            });
        }
        Ok(())
    }

    /// Gateway deadlines.
    pub fn call_policy(&self) -> CallPolicy {
        CallPolicy {
            read_timeout: Duration::from_secs(self.read_timeout_secs),
            write_timeout: Duration::from_secs(self.write_timeout_secs),
        }
    }

    /// Cache lifetime.
    ///
    /// Clamped to [`MAX_CACHE_TTL_SECS`] for configs that skipped `validate`.
    pub fn cache_ttl(&self) -> chrono::Duration {
        let secs = self.cache_ttl_secs.min(MAX_CACHE_TTL_SECS) as i64;
        chrono::Duration::try_seconds(secs).unwrap_or_else(chrono::Duration::zero)
    }

    /// Cache namespace.
    pub fn user(&self) -> UserId {
        UserId::new(self.user_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let file = write(r#"{"api_url": "https://api.example.test", "cache_ttl_secs": 60}"#);
        let config = SessionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.api_url, "https://api.example.test");
        assert_eq!(config.cache_ttl(), chrono::Duration::seconds(60));
        assert_eq!(config.read_timeout_secs, 8);
        assert_eq!(config.call_policy().write_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_zero_read_timeout_rejected() {
        let file = write(r#"{"read_timeout_secs": 0}"#);
        let err = SessionConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "read_timeout_secs", .. }));
    }

    #[test]
    fn test_oversized_cache_ttl_rejected() {
        let file = write(r#"{"cache_ttl_secs": 18446744073709551615}"#);
        let err = SessionConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "cache_ttl_secs", .. }));

        let config = SessionConfig {
            cache_ttl_secs: 10_000_000_000_000_000,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let year = SessionConfig {
            cache_ttl_secs: MAX_CACHE_TTL_SECS,
            ..Default::default()
        };
        assert!(year.validate().is_ok());
    }

    #[test]
    fn test_cache_ttl_clamps_unvalidated_values() {
        let config = SessionConfig {
            cache_ttl_secs: u64::MAX,
            ..Default::default()
        };
        assert_eq!(config.cache_ttl(), chrono::Duration::days(365));
    }

    #[test]
    fn test_empty_url_rejected() {
        let config = SessionConfig {
            api_url: " ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_json_and_missing_file() {
        let file = write("{not json");
        assert!(matches!(
            SessionConfig::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            SessionConfig::from_file(dir.path().join("missing.json")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_load_without_path_is_default() {
        assert_eq!(SessionConfig::load(None).unwrap(), SessionConfig::default());
    }
}
