//! Machine Translation trait and utilities
//!
//! This module defines the `MachineTranslator` trait for provider abstraction,
//! so the tree walker and the language session never depend on a concrete
//! backend (LibreTranslate, mock, etc.).
//!
//! # Example
//!
//! ```ignore
//! use leafy_i18n::mt::{MachineTranslator, LibreTranslateProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = LibreTranslateProvider::from_env()?;
//!
//!     let result = provider.translate("Hello, world!", "en", "fr").await?;
//!     println!("{}", result); // "Bonjour, le monde!"
//!
//!     Ok(())
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use async_trait::async_trait;

/// Generic trait for machine translation providers
///
/// Implementations handle the actual translation work, whether through an
/// HTTP API or deterministic logic (Mock). Every failure mode surfaces as an
/// `MtError`; callers decide whether it is fatal.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate a single text string from source to target locale
    ///
    /// # Arguments
    ///
    /// * `text` - The text to translate
    /// * `source_locale` - Source language code (e.g., "en", or "auto")
    /// * `target_locale` - Target language code (e.g., "fr")
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String>;

    /// Translate multiple strings, preserving input order
    ///
    /// The default issues one `translate` call per string and fails on the
    /// first error. Providers with a real batch endpoint should override it.
    async fn translate_batch(
        &self,
        texts: &[String],
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<Vec<String>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.translate(text, source_locale, target_locale).await?);
        }
        Ok(results)
    }

    /// Get the name of this translation provider, used in log output
    fn provider_name(&self) -> &str;
}

/// Normalize a locale code by stripping region information
///
/// - `en-US` → `en`
/// - `zh-Hans` → `zh`
/// - `fr` → `fr`
pub fn normalize_locale(locale: &str) -> String {
    locale.split(['-', '_']).next().unwrap_or(locale).to_lowercase()
}

/// Whether two locale codes name the same base language
pub fn same_language(a: &str, b: &str) -> bool {
    normalize_locale(a) == normalize_locale(b)
}

/// Validate that a locale code is in acceptable format
///
/// Accepts ASCII alphanumerics, hyphens and underscores. `auto` passes, so a
/// provider may be asked to detect the source language.
pub fn validate_locale(locale: &str) -> MtResult<()> {
    if locale.is_empty() {
        return Err(MtError::InvalidLocale("Locale code is empty".to_string()));
    }

    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(MtError::InvalidLocale(format!(
            "Invalid characters in locale code: {}",
            locale
        )));
    }

    Ok(())
}
