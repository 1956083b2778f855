//! Configuration management for the booking flow.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Binaries call `dotenvy::dotenv()` first so a `.env` file works too.

use crate::error::{BookingError, Result};
use crate::types::Marketplace;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use vibes_auth::StorageKind;

/// Booking flow configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Backend base URL, without a trailing slash
    pub api_base_url: String,
    /// Marketplace the flow books against
    pub marketplace: Marketplace,
    /// Where the auth token is kept: `local` (file) or `session` (memory)
    pub auth_storage: StorageKind,
    /// Token file used by `local` storage
    pub auth_file: PathBuf,
    /// How long each step waits for the backend, in seconds
    pub response_timeout_secs: u64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            marketplace: Marketplace::Catering,
            auth_storage: StorageKind::Local,
            auth_file: PathBuf::from(".vibes-auth.json"),
            response_timeout_secs: 30,
        }
    }
}

impl BookingConfig {
    /// Load configuration from environment variables
    ///
    /// - `VIBES_API_BASE_URL` (default `http://localhost:8000/api`)
    /// - `VIBES_MARKETPLACE`: `catering`, `staffing` or `event` (default `catering`)
    /// - `VIBES_AUTH_STORAGE`: `local` or `session` (default `local`)
    /// - `VIBES_AUTH_FILE` (default `.vibes-auth.json`)
    /// - `VIBES_RESPONSE_TIMEOUT_SECS` (default 30)
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidConfig`] for an unknown marketplace or
    /// storage kind. Unparseable numbers fall back to their default.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment
    ///
    /// # Errors
    ///
    /// Same as [`BookingConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let marketplace = match lookup("VIBES_MARKETPLACE") {
            Some(value) => value.parse()?,
            None => defaults.marketplace,
        };

        let auth_storage = match lookup("VIBES_AUTH_STORAGE") {
            Some(value) => value.parse().map_err(BookingError::from)?,
            None => defaults.auth_storage,
        };

        Ok(Self {
            api_base_url: lookup("VIBES_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            marketplace,
            auth_storage,
            auth_file: lookup("VIBES_AUTH_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.auth_file),
            response_timeout_secs: lookup("VIBES_RESPONSE_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.response_timeout_secs),
        })
    }

    /// Response timeout as a [`Duration`]
    #[must_use]
    pub const fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.response_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BookingConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, BookingConfig::default());
        assert_eq!(config.response_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let config = BookingConfig::from_lookup(lookup(&[
            ("VIBES_API_BASE_URL", "https://api.vibes.events/v2/"),
            ("VIBES_MARKETPLACE", "staffing"),
            ("VIBES_AUTH_STORAGE", "session"),
            ("VIBES_AUTH_FILE", "/tmp/token.json"),
            ("VIBES_RESPONSE_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.api_base_url, "https://api.vibes.events/v2");
        assert_eq!(config.marketplace, Marketplace::Staffing);
        assert_eq!(config.auth_storage, StorageKind::Session);
        assert_eq!(config.auth_file, PathBuf::from("/tmp/token.json"));
        assert_eq!(config.response_timeout_secs, 5);
    }

    #[test]
    fn test_bad_timeout_falls_back() {
        let config =
            BookingConfig::from_lookup(lookup(&[("VIBES_RESPONSE_TIMEOUT_SECS", "soon")])).unwrap();
        assert_eq!(config.response_timeout_secs, 30);
    }

    #[test]
    fn test_unknown_values_are_rejected() {
        assert!(matches!(
            BookingConfig::from_lookup(lookup(&[("VIBES_MARKETPLACE", "florists")])),
            Err(BookingError::InvalidConfig(_))
        ));
        assert!(matches!(
            BookingConfig::from_lookup(lookup(&[("VIBES_AUTH_STORAGE", "cookie")])),
            Err(BookingError::InvalidConfig(_))
        ));
    }
}
