//! Key-value persistence surface
//!
//! A `CacheStore` holds string values under string keys, the way a
//! browser's local storage does. The translation cache and the language
//! preference each occupy one key.

use crate::mt::error::{MtError, MtResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// String key-value storage
///
/// `set` must be durable when it returns: a value written and acknowledged
/// survives a crash of the calling process.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> MtResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> MtResult<()>;
    fn remove(&self, key: &str) -> MtResult<()>;
}

/// In-process store, lost when dropped
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MtResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| MtError::CacheRead("memory store lock poisoned".to_string()))
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> MtResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> MtResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> MtResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object on disk
///
/// Every `set` rewrites the whole document through a sibling temporary file
/// followed by a rename, so readers never see a half-written file. An
/// unreadable or malformed document is reported as `CacheRead`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> MtResult<serde_json::Map<String, serde_json::Value>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(serde_json::Map::new());
            }
            Err(e) => {
                return Err(MtError::CacheRead(format!(
                    "Cannot read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };
        if raw.trim().is_empty() {
            return Ok(serde_json::Map::new());
        }
        match serde_json::from_str::<serde_json::Value>(&raw)? {
            serde_json::Value::Object(map) => Ok(map),
            _ => Err(MtError::CacheRead(format!(
                "{} does not hold a JSON object",
                self.path.display()
            ))),
        }
    }

    fn save(&self, document: &serde_json::Map<String, serde_json::Value>) -> MtResult<()> {
        let write_err =
            |e: std::io::Error| MtError::CacheWrite(format!("{}: {}", self.path.display(), e));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let serialized = serde_json::to_string_pretty(document)
            .map_err(|e| MtError::CacheWrite(e.to_string()))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, serialized).map_err(write_err)?;
        std::fs::rename(&tmp, &self.path).map_err(write_err)
    }

    /// Read-modify-write under the write lock. A corrupt document is
    /// replaced rather than blocking every future write.
    fn update(
        &self,
        apply: impl FnOnce(&mut serde_json::Map<String, serde_json::Value>),
    ) -> MtResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| MtError::CacheWrite("file store lock poisoned".to_string()))?;
        let mut document = match self.load() {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Discarding unreadable store"
                );
                serde_json::Map::new()
            }
        };
        apply(&mut document);
        self.save(&document)
    }
}

impl CacheStore for FileStore {
    fn get(&self, key: &str) -> MtResult<Option<String>> {
        Ok(self
            .load()?
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> MtResult<()> {
        self.update(|document| {
            document.insert(key.to_string(), serde_json::Value::String(value.to_string()));
        })
    }

    fn remove(&self, key: &str) -> MtResult<()> {
        self.update(|document| {
            document.remove(key);
        })
    }
}
