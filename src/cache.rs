//! Persistent `(text, lang) → translation` cache
//!
//! The whole cache lives under a single store key as a JSON object mapping
//! `"<text>_<lang>"` to the translated string. It is read once when the cache
//! is opened and rewritten after every `put`, so an acknowledged entry is
//! never lost. There is no eviction and no expiry; entries accumulate until
//! the store is cleared.

use crate::mt::error::{MtError, MtResult};
use crate::store::CacheStore;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Store key holding the serialized cache
pub const CACHE_STORE_KEY: &str = "translationCache";

pub struct TranslationCache {
    store: Arc<dyn CacheStore>,
    entries: Mutex<BTreeMap<String, String>>,
}

impl TranslationCache {
    /// Open the cache persisted in `store`
    ///
    /// A missing document, an unreadable store, or a document that is not a
    /// JSON object all open as an empty cache. Individual non-string values
    /// are skipped.
    pub fn open(store: Arc<dyn CacheStore>) -> Self {
        let entries = match store.get(CACHE_STORE_KEY) {
            Ok(Some(raw)) => parse_document(&raw),
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                warn!(error = %e, "Translation cache unreadable, starting empty");
                BTreeMap::new()
            }
        };
        debug!(entries = entries.len(), "Translation cache opened");
        Self {
            store,
            entries: Mutex::new(entries),
        }
    }

    /// Serialized slot name for a text/language pair
    pub fn cache_key(text: &str, lang: &str) -> String {
        format!("{}_{}", text, lang)
    }

    pub fn get(&self, text: &str, lang: &str) -> MtResult<Option<String>> {
        let entries = self.lock(MtError::CacheRead)?;
        Ok(entries.get(&Self::cache_key(text, lang)).cloned())
    }

    /// Record a translation and persist the cache before returning
    ///
    /// Last write wins. On a persistence failure the entry remains usable
    /// for the lifetime of this cache but an error is returned.
    pub fn put(&self, text: &str, lang: &str, translation: &str) -> MtResult<()> {
        let mut entries = self.lock(MtError::CacheWrite)?;
        entries.insert(Self::cache_key(text, lang), translation.to_string());
        self.persist(&entries)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry, in memory and in the store
    pub fn clear(&self) -> MtResult<()> {
        let mut entries = self.lock(MtError::CacheWrite)?;
        entries.clear();
        self.store.remove(CACHE_STORE_KEY)
    }

    fn lock(
        &self,
        err: impl FnOnce(String) -> MtError,
    ) -> MtResult<MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| err("translation cache lock poisoned".to_string()))
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> MtResult<()> {
        let document =
            serde_json::to_string(entries).map_err(|e| MtError::CacheWrite(e.to_string()))?;
        self.store.set(CACHE_STORE_KEY, &document)
    }
}

impl std::fmt::Debug for TranslationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationCache")
            .field("entries", &self.len())
            .finish()
    }
}

fn parse_document(raw: &str) -> BTreeMap<String, String> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(map)) => map
            .into_iter()
            .filter_map(|(key, value)| match value {
                serde_json::Value::String(s) => Some((key, s)),
                _ => None,
            })
            .collect(),
        Ok(_) => {
            warn!("Translation cache is not a JSON object, starting empty");
            BTreeMap::new()
        }
        Err(e) => {
            warn!(error = %e, "Translation cache is corrupt, starting empty");
            BTreeMap::new()
        }
    }
}
