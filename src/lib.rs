//! Structure-preserving machine translation
//!
//! Translates the text leaves of a presentation tree in place, and the
//! string leaves of arbitrary JSON values, through an external provider,
//! remembering every `(text, language)` pair in a persistent cache.
//!
//! # Workflow Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use leafy_i18n::{LanguageSession, PresentationNode, TranslationCache, TreeTranslator};
//! use leafy_i18n::config::Config;
//! use leafy_i18n::mt::LibreTranslateProvider;
//! use leafy_i18n::store::FileStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let store = Arc::new(FileStore::new("leafy-store.json"));
//!     let cache = Arc::new(TranslationCache::open(store.clone()));
//!     let provider = Arc::new(LibreTranslateProvider::from_config(&config)?);
//!     let translator = TreeTranslator::from_config(provider, cache, &config);
//!
//!     let page = PresentationNode::container(vec![PresentationNode::text("Hello")]);
//!     let session = LanguageSession::new(store, translator, page, &config.default_lang);
//!     session.set_language("fr").await?;
//!     println!("{:?}", session.snapshot().await);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod codec;
pub mod config;
pub mod mt;
pub mod session;
pub mod store;
pub mod tree;
pub mod walker;

#[cfg(test)]
mod integration_tests;

// Re-export main types for convenient access
pub use cache::TranslationCache;
pub use config::Config;
pub use mt::{MachineTranslator, MtError, MtResult};
pub use session::{LanguageSession, SessionState};
pub use store::{CacheStore, FileStore, MemoryStore};
pub use tree::PresentationNode;
pub use walker::{Generations, PassToken, TranslationReport, TreeTranslator};
