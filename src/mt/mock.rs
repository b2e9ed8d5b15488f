//! Mock Machine Translator for testing
//!
//! This module provides a deterministic, API-free translator for exercising
//! the cache, the tree walker and the session without network access.
//! Every request is recorded so tests can assert how often the provider was
//! actually reached.
//!
//! # Example
//!
//! ```ignore
//! use leafy_i18n::mt::{MachineTranslator, MockTranslator, MockMode};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock.translate("hello", "en", "fr").await.unwrap();
//!     assert_eq!(result, "hello_fr");
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::MachineTranslator;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append locale suffix: "hello" → "hello_fr"
    Suffix,

    /// Use predefined mappings for realistic translations
    /// (text, target_locale) → translation, falling back to `Suffix`
    Mappings(HashMap<(String, String), String>),

    /// Fail for the listed texts, suffix everything else
    FailOn(HashSet<String>),

    /// Simulate a provider that is down
    Error(String),

    /// No-op: return input unchanged
    NoOp,
}

/// Mock translator that simulates various translation scenarios
///
/// Clones share the request log, so a clone handed to a walker can be
/// inspected through the original.
#[derive(Debug, Clone)]
pub struct MockTranslator {
    mode: MockMode,
    /// Optional simulated network delay (in milliseconds)
    delay_ms: u64,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockTranslator {
    /// Create a new MockTranslator with the given mode
    pub fn new(mode: MockMode) -> Self {
        Self::with_delay(mode, 0)
    }

    /// Create a MockTranslator with simulated network delay
    ///
    /// ```ignore
    /// let mock = MockTranslator::with_delay(MockMode::Suffix, 50);
    /// // Each translation will have ~50ms delay
    /// ```
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self {
            mode,
            delay_ms,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Convenience constructor for `MockMode::Mappings` targeting one locale
    pub fn with_mappings(target_locale: &str, pairs: &[(&str, &str)]) -> Self {
        let map = pairs
            .iter()
            .map(|(from, to)| {
                (
                    (from.to_string(), target_locale.to_string()),
                    to.to_string(),
                )
            })
            .collect();
        Self::new(MockMode::Mappings(map))
    }

    /// Texts received so far, in arrival order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    /// Number of `translate` calls received
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|log| log.len()).unwrap_or(0)
    }

    async fn apply_delay(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }

    fn record(&self, text: &str) {
        if let Ok(mut log) = self.requests.lock() {
            log.push(text.to_string());
        }
    }

    fn apply_translation(&self, text: &str, target: &str) -> MtResult<String> {
        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target)))
            }
            MockMode::FailOn(texts) if texts.contains(text) => Err(
                MtError::ProviderBadResponse(format!("mock refused '{}'", text)),
            ),
            MockMode::FailOn(_) => Ok(format!("{}_{}", text, target)),
            MockMode::Error(msg) => Err(MtError::ProviderUnavailable(msg.clone())),
            MockMode::NoOp => Ok(text.to_string()),
        }
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        _source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        self.record(text);
        self.apply_delay().await;
        self.apply_translation(text, target_locale)
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_suffix_single_translation() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let result = mock.translate("hello", "en", "fr").await.unwrap();
        assert_eq!(result, "hello_fr");
    }

    #[tokio::test]
    async fn test_mapping_single_translation() {
        let mock = MockTranslator::with_mappings("fr", &[("hello", "bonjour")]);
        assert_eq!(mock.translate("hello", "en", "fr").await.unwrap(), "bonjour");
        // Same text, other locale: no mapping
        assert_eq!(mock.translate("hello", "en", "de").await.unwrap(), "hello_de");
    }

    #[tokio::test]
    async fn test_fail_on_listed_text_only() {
        let fail: HashSet<String> = ["bad".to_string()].into_iter().collect();
        let mock = MockTranslator::new(MockMode::FailOn(fail));
        assert!(matches!(
            mock.translate("bad", "en", "fr").await,
            Err(MtError::ProviderBadResponse(_))
        ));
        assert_eq!(mock.translate("good", "en", "fr").await.unwrap(), "good_fr");
    }

    #[tokio::test]
    async fn test_error_mode_returns_error() {
        let mock = MockTranslator::new(MockMode::Error("API unavailable".to_string()));
        match mock.translate("hello", "en", "fr").await {
            Err(MtError::ProviderUnavailable(msg)) => assert_eq!(msg, "API unavailable"),
            other => panic!("Expected ProviderUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_noop_returns_unchanged() {
        let mock = MockTranslator::new(MockMode::NoOp);
        let result = mock.translate("Hello world", "en", "fr").await.unwrap();
        assert_eq!(result, "Hello world");
    }

    #[tokio::test]
    async fn test_requests_are_recorded_across_clones() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let clone = mock.clone();
        clone.translate("one", "en", "fr").await.unwrap();
        clone.translate("two", "en", "fr").await.unwrap();
        assert_eq!(mock.call_count(), 2);
        assert_eq!(mock.requests(), vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_default_batch_preserves_order() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let texts = vec!["first".to_string(), "second".to_string()];
        let results = mock.translate_batch(&texts, "en", "fr").await.unwrap();
        assert_eq!(results, vec!["first_fr", "second_fr"]);
    }

    #[tokio::test]
    async fn test_default_batch_stops_on_error() {
        let mock = MockTranslator::new(MockMode::Error("down".to_string()));
        let texts = vec!["a".to_string(), "b".to_string()];
        assert!(mock.translate_batch(&texts, "en", "fr").await.is_err());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_delay_adds_latency() {
        let mock = MockTranslator::with_delay(MockMode::Suffix, 50);
        let start = std::time::Instant::now();
        let _ = mock.translate("hello", "en", "fr").await.unwrap();
        assert!(start.elapsed().as_millis() >= 50);
    }

    #[test]
    fn test_provider_name() {
        let mock = MockTranslator::new(MockMode::Suffix);
        assert_eq!(mock.provider_name(), "Mock Translator");
    }
}
