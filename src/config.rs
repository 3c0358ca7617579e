//! Runtime configuration
//!
//! Holds the API credential and the knobs needed to assemble a repository. Values
//! come from CLI flags and their environment fallbacks (see `cli`).

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::warn;

use crate::api::{ApiFootballClient, API_FOOTBALL_BASE_URL};
use crate::cache::{CacheManager, CacheStore, InMemoryCache};
use crate::error::FailureReason;
use crate::normalize::DASHBOARD_URL;
use crate::repository::FootballRepository;
use crate::season::SeasonCalculator;

/// Value shipped in sample configs; never a real key
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "API_FOOTBALL_KEY";

/// Default per-request timeout applied by the HTTP client
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The API key, kept out of debug output
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key if it is usable
    ///
    /// Blank keys and the placeholder are rejected with a message telling the
    /// operator where to configure one.
    pub fn validate(&self) -> Result<&str, FailureReason> {
        let key = self.0.trim();
        if key.is_empty() || key == PLACEHOLDER_API_KEY {
            return Err(FailureReason::Configuration(format!(
                "Please configure your API key with --api-key or the {} environment variable. Get your API key from {}",
                API_KEY_ENV, DASHBOARD_URL
            )));
        }
        Ok(key)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Everything needed to build a `FootballRepository`
#[derive(Debug, Clone)]
pub struct Config {
    pub credential: Credential,
    pub base_url: String,
    /// Overrides the XDG cache directory
    pub cache_dir: Option<PathBuf>,
    /// Keep responses in memory only
    pub memory_cache: bool,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credential: Credential::default(),
            base_url: API_FOOTBALL_BASE_URL.to_string(),
            cache_dir: None,
            memory_cache: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl Config {
    /// Picks the cache store: an explicit directory, the XDG directory, or memory
    pub fn build_cache(&self) -> Arc<dyn CacheStore> {
        if self.memory_cache {
            return Arc::new(InMemoryCache::new());
        }
        if let Some(dir) = &self.cache_dir {
            return Arc::new(CacheManager::with_dir(dir.clone()));
        }
        match CacheManager::new() {
            Some(manager) => Arc::new(manager),
            None => {
                warn!("no cache directory available, caching in memory only");
                Arc::new(InMemoryCache::new())
            }
        }
    }

    /// Builds the HTTP client with the configured timeout and base URL
    pub fn build_client(&self) -> Result<ApiFootballClient, reqwest::Error> {
        let http = Client::builder().timeout(self.request_timeout).build()?;
        Ok(ApiFootballClient::with_client(http).with_base_url(self.base_url.clone()))
    }

    /// Assembles a repository from this configuration
    pub fn build_repository(&self) -> Result<FootballRepository, reqwest::Error> {
        Ok(FootballRepository::new(
            Arc::new(self.build_client()?),
            self.build_cache(),
            self.credential.clone(),
            SeasonCalculator::default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_credential() {
        let credential = Credential::new("abc123");
        assert_eq!(credential.validate(), Ok("abc123"));
    }

    #[test]
    fn test_blank_credential_rejected() {
        for key in ["", "   ", "\t\n"] {
            let credential = Credential::new(key);
            let result = credential.validate();
            assert!(matches!(result, Err(FailureReason::Configuration(_))), "key {:?}", key);
        }
    }

    #[test]
    fn test_placeholder_credential_rejected() {
        let err = Credential::new(PLACEHOLDER_API_KEY).validate().unwrap_err();
        assert!(err.message().contains("API_FOOTBALL_KEY"));
        assert!(err.message().contains(DASHBOARD_URL));
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("super-secret");
        assert!(!format!("{:?}", credential).contains("super-secret"));
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, API_FOOTBALL_BASE_URL);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert!(!config.memory_cache);
    }

    #[test]
    fn test_build_client_uses_base_url() {
        let config = Config {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let client = config.build_client().expect("Client should build");
        assert_eq!(client.base_url(), "http://127.0.0.1:9");
    }
}
