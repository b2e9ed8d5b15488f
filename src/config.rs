//! Runtime configuration
//!
//! Settings come from three layers, lowest priority first: built-in
//! defaults, a JSON file or `LEAFY_*` environment variables, and finally
//! command-line flags applied by the binary.

use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::validate_locale;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/translate";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Translate endpoint URL
    pub endpoint: String,
    pub api_key: Option<String>,
    /// Language all source content is authored in, or `auto`
    pub source_lang: String,
    /// Language used when no preference has been persisted
    pub default_lang: String,
    /// HTTP client timeout
    pub request_timeout_secs: u64,
    /// Upper bound for a single provider call; expiry counts as a failure
    pub provider_timeout_secs: u64,
    /// Leaves translated concurrently; 1 keeps strict document order
    pub max_concurrency: usize,
    /// Backing file for the cache and the language preference
    pub store_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            source_lang: "en".to_string(),
            default_lang: "en".to_string(),
            request_timeout_secs: 30,
            provider_timeout_secs: 30,
            max_concurrency: 1,
            store_path: None,
        }
    }
}

impl Config {
    /// Load from `LEAFY_*` environment variables over the defaults
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `LEAFY_ENDPOINT` | `endpoint` |
    /// | `LEAFY_API_KEY` | `api_key` |
    /// | `LEAFY_SOURCE_LANG` | `source_lang` |
    /// | `LEAFY_DEFAULT_LANG` | `default_lang` |
    /// | `LEAFY_TIMEOUT_SECS` | both timeouts |
    /// | `LEAFY_CONCURRENCY` | `max_concurrency` |
    /// | `LEAFY_STORE` | `store_path` |
    pub fn from_env() -> MtResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> MtResult<Self> {
        let mut config = Self::default();
        if let Some(endpoint) = lookup("LEAFY_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Some(key) = lookup("LEAFY_API_KEY") {
            config.api_key = Some(key);
        }
        if let Some(lang) = lookup("LEAFY_SOURCE_LANG") {
            config.source_lang = lang;
        }
        if let Some(lang) = lookup("LEAFY_DEFAULT_LANG") {
            config.default_lang = lang;
        }
        if let Some(secs) = lookup("LEAFY_TIMEOUT_SECS") {
            let secs = parse_number::<u64>("LEAFY_TIMEOUT_SECS", &secs)?;
            config.request_timeout_secs = secs;
            config.provider_timeout_secs = secs;
        }
        if let Some(n) = lookup("LEAFY_CONCURRENCY") {
            config.max_concurrency = parse_number("LEAFY_CONCURRENCY", &n)?;
        }
        if let Some(path) = lookup("LEAFY_STORE") {
            config.store_path = Some(PathBuf::from(path));
        }
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file; absent fields keep their defaults
    pub fn from_file(path: &Path) -> MtResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| MtError::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        let config: Config = serde_json::from_str(&raw)
            .map_err(|e| MtError::Config(format!("Invalid config {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MtResult<()> {
        if self.endpoint.trim().is_empty() {
            return Err(MtError::Config("endpoint cannot be empty".to_string()));
        }
        if self.max_concurrency == 0 {
            return Err(MtError::Config("max_concurrency must be at least 1".to_string()));
        }
        if self.provider_timeout_secs == 0 {
            return Err(MtError::Config("provider_timeout_secs must be at least 1".to_string()));
        }
        validate_locale(&self.source_lang)?;
        validate_locale(&self.default_lang)?;
        Ok(())
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> MtResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| MtError::Config(format!("{} must be a number, got '{}'", name, value)))
}
