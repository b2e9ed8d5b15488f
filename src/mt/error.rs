use thiserror::Error;

/// Error types for translation, caching and configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MtError {
    /// Transport failure, connection refused, or a call that timed out
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Non-2xx status or a body without `translatedText`
    #[error("Provider bad response: {0}")]
    ProviderBadResponse(String),
    /// Persistence layer could not be read
    #[error("Cache read error: {0}")]
    CacheRead(String),
    /// Persistence layer could not be written
    #[error("Cache write error: {0}")]
    CacheWrite(String),
    /// Locale code is empty or malformed
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),
    /// Missing or inconsistent configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MtError {
    /// True for errors raised by the translation provider
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            MtError::ProviderUnavailable(_) | MtError::ProviderBadResponse(_)
        )
    }
}

impl From<reqwest::Error> for MtError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            MtError::ProviderBadResponse(format!("Failed to decode response: {}", e))
        } else {
            MtError::ProviderUnavailable(e.to_string())
        }
    }
}

impl From<serde_json::Error> for MtError {
    fn from(e: serde_json::Error) -> Self {
        MtError::CacheRead(format!("Malformed JSON: {}", e))
    }
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_message() {
        let err = MtError::ProviderBadResponse("HTTP 500".to_string());
        assert_eq!(err.to_string(), "Provider bad response: HTTP 500");
    }

    #[test]
    fn test_provider_error_classification() {
        assert!(MtError::ProviderUnavailable("x".into()).is_provider_error());
        assert!(MtError::ProviderBadResponse("x".into()).is_provider_error());
        assert!(!MtError::CacheWrite("x".into()).is_provider_error());
        assert!(!MtError::InvalidLocale("x".into()).is_provider_error());
    }

    #[test]
    fn test_json_error_maps_to_cache_read() {
        let err: MtError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert!(matches!(err, MtError::CacheRead(_)));
    }
}
