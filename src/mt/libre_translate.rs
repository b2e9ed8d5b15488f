//! LibreTranslate-compatible HTTP provider
//!
//! Sends `POST {endpoint}` with a JSON body
//! `{"q": .., "source": .., "target": .., "format": "text"}` and reads
//! `translatedText` from the response. Any LibreTranslate instance (public,
//! self-hosted, or a compatible proxy) works.
//!
//! # Configuration
//!
//! The endpoint is mandatory; an API key is only sent when configured. See
//! [`crate::config::Config`] for the environment variables.
//!
//! # Example
//!
//! ```ignore
//! use leafy_i18n::mt::{MachineTranslator, LibreTranslateProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = LibreTranslateProvider::from_env()?;
//!     let result = provider.translate("Hello, world!", "en", "fr").await?;
//!     println!("{}", result);
//!     Ok(())
//! }
//! ```

use crate::config::Config;
use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::{MachineTranslator, same_language, validate_locale};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

/// LibreTranslate API provider
#[derive(Clone)]
pub struct LibreTranslateProvider {
    /// Full URL of the translate endpoint
    endpoint: String,
    /// Optional API key, sent as `api_key` in the request body
    api_key: Option<String>,
    /// HTTP client for async requests
    client: reqwest::Client,
}

impl LibreTranslateProvider {
    /// Maximum characters per string accepted before a request is attempted
    const MAX_CHARS_PER_STRING: usize = 30_000;

    /// Create a provider for `endpoint` with a client-level request timeout
    ///
    /// # Returns
    ///
    /// * `Err(MtError::Config)` - If the endpoint is empty
    /// * `Err(MtError::ProviderUnavailable)` - If the HTTP client cannot be built
    pub fn new(endpoint: String, api_key: Option<String>, timeout: Duration) -> MtResult<Self> {
        if endpoint.trim().is_empty() {
            return Err(MtError::Config("Endpoint cannot be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                MtError::ProviderUnavailable(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            endpoint,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            client,
        })
    }

    /// Build a provider from the translation settings in `config`
    pub fn from_config(config: &Config) -> MtResult<Self> {
        Self::new(
            config.endpoint.clone(),
            config.api_key.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Build a provider from `LEAFY_*` environment variables
    pub fn from_env() -> MtResult<Self> {
        Self::from_config(&Config::from_env()?)
    }

    /// Request body for a single string
    fn request_body(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> serde_json::Value {
        let mut body = json!({
            "q": text,
            "source": source_locale,
            "target": target_locale,
            "format": "text"
        });
        if let Some(key) = &self.api_key {
            body["api_key"] = json!(key);
        }
        body
    }
}

/// Interpret a provider response
///
/// Non-2xx statuses and bodies without a string `translatedText` are
/// `ProviderBadResponse`, carrying the upstream `error` field when the body
/// has one. A `detectedLanguage` that disagrees with a fixed
/// `source_locale` is logged, since the provider then translated from a
/// language other than the one requested.
pub(crate) fn parse_response(
    status: StatusCode,
    body: &str,
    source_locale: &str,
) -> MtResult<String> {
    let json: Option<serde_json::Value> = serde_json::from_str(body).ok();

    if !status.is_success() {
        let upstream = json
            .as_ref()
            .and_then(|v| v["error"].as_str())
            .map(str::to_string)
            .unwrap_or_else(|| body.trim().to_string());
        return Err(MtError::ProviderBadResponse(format!(
            "HTTP {}: {}",
            status, upstream
        )));
    }

    let json = json.ok_or_else(|| {
        MtError::ProviderBadResponse("Response body is not valid JSON".to_string())
    })?;

    if let Some(detected) = json["detectedLanguage"]["language"].as_str() {
        if source_locale != "auto" && !same_language(detected, source_locale) {
            warn!(
                configured = source_locale,
                detected, "Provider detected a different source language"
            );
        }
    }

    json["translatedText"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| {
            MtError::ProviderBadResponse(
                "Invalid API response: missing 'translatedText' field".to_string(),
            )
        })
}

impl std::fmt::Debug for LibreTranslateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibreTranslateProvider")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for LibreTranslateProvider {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;

        if text.is_empty() {
            return Ok(String::new());
        }

        if text.chars().count() > Self::MAX_CHARS_PER_STRING {
            return Err(MtError::ProviderBadResponse(format!(
                "Text exceeds maximum length of {} characters",
                Self::MAX_CHARS_PER_STRING
            )));
        }

        debug!(
            endpoint = %self.endpoint,
            source_locale,
            target_locale,
            "Sending translation request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&self.request_body(text, source_locale, target_locale))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        parse_response(status, &body, source_locale)
    }

    fn provider_name(&self) -> &str {
        "LibreTranslate"
    }
}
