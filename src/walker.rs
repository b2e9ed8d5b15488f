//! In-place translation of presentation trees
//!
//! `TreeTranslator` visits every text leaf of a [`PresentationNode`] tree in
//! document order. Blank leaves are skipped outright. For the rest the cache
//! is consulted first; on a miss the provider is called, the result is
//! written to the cache, and only then is the leaf changed. A failing leaf
//! keeps its text and the pass moves on, so a pass always completes.
//! Leaves with identical text share a single lookup and provider call.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use leafy_i18n::{PresentationNode, TranslationCache, TreeTranslator};
//! use leafy_i18n::mt::MockTranslator;
//! use leafy_i18n::store::MemoryStore;
//!
//! let cache = Arc::new(TranslationCache::open(Arc::new(MemoryStore::new())));
//! let provider = Arc::new(MockTranslator::with_mappings("fr", &[("Hello", "Bonjour")]));
//! let translator = TreeTranslator::new(provider, cache);
//!
//! let mut page = PresentationNode::container(vec![PresentationNode::text("Hello")]);
//! let report = translator.translate(&mut page, "fr").await;
//! assert_eq!(report.translated, 1);
//! ```

use crate::cache::TranslationCache;
use crate::codec;
use crate::config::Config;
use crate::mt::error::MtError;
use crate::mt::translator::MachineTranslator;
use crate::tree::PresentationNode;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Monotonic pass counter shared by everyone translating one tree
#[derive(Debug, Clone, Default)]
pub struct Generations {
    current: Arc<AtomicU64>,
}

impl Generations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new pass, superseding every earlier token
    pub fn begin(&self) -> PassToken {
        let generation = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        PassToken {
            generation,
            current: Arc::clone(&self.current),
        }
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }
}

/// Cooperative cancellation for one pass
#[derive(Debug, Clone)]
pub struct PassToken {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl PassToken {
    /// A token no other pass can supersede
    pub fn detached() -> Self {
        Generations::new().begin()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }
}

/// Summary of one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationReport {
    /// Leaves filled from the provider
    pub translated: usize,
    /// Leaves filled from the cache
    pub cached: usize,
    /// Leaves left unchanged after a provider failure
    pub failed: usize,
    /// Blank leaves
    pub skipped: usize,
    /// A newer pass took over before this one finished
    pub superseded: bool,
}

impl TranslationReport {
    fn record(&mut self, outcome: LeafOutcome) {
        match outcome {
            LeafOutcome::Skipped => self.skipped += 1,
            LeafOutcome::Cached => self.cached += 1,
            LeafOutcome::Translated => self.translated += 1,
            LeafOutcome::Failed => self.failed += 1,
            LeafOutcome::Superseded => self.superseded = true,
        }
    }

    /// Leaves that now hold target-language text
    pub fn updated(&self) -> usize {
        self.translated + self.cached
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LeafOutcome {
    Skipped,
    Cached,
    Translated,
    Failed,
    Superseded,
}

pub struct TreeTranslator {
    provider: Arc<dyn MachineTranslator>,
    cache: Arc<TranslationCache>,
    source_lang: String,
    provider_timeout: Duration,
    max_concurrency: usize,
}

impl TreeTranslator {
    /// Source `en`, 30 second provider timeout, one leaf at a time
    pub fn new(provider: Arc<dyn MachineTranslator>, cache: Arc<TranslationCache>) -> Self {
        Self {
            provider,
            cache,
            source_lang: "en".to_string(),
            provider_timeout: Duration::from_secs(30),
            max_concurrency: 1,
        }
    }

    pub fn from_config(
        provider: Arc<dyn MachineTranslator>,
        cache: Arc<TranslationCache>,
        config: &Config,
    ) -> Self {
        Self::new(provider, cache)
            .with_source_lang(&config.source_lang)
            .with_provider_timeout(config.provider_timeout())
            .with_max_concurrency(config.max_concurrency)
    }

    pub fn with_source_lang(mut self, source_lang: &str) -> Self {
        self.source_lang = source_lang.to_string();
        self
    }

    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    /// Values below 1 are treated as 1
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn source_lang(&self) -> &str {
        &self.source_lang
    }

    pub fn cache(&self) -> &Arc<TranslationCache> {
        &self.cache
    }

    /// Translate every leaf of `root` into `target_lang`
    pub async fn translate(
        &self,
        root: &mut PresentationNode,
        target_lang: &str,
    ) -> TranslationReport {
        self.translate_with_token(root, target_lang, &PassToken::detached())
            .await
    }

    /// Like [`translate`](Self::translate), stopping once `token` is superseded
    pub async fn translate_with_token(
        &self,
        root: &mut PresentationNode,
        target_lang: &str,
        token: &PassToken,
    ) -> TranslationReport {
        let report = self.run(root.texts_mut(), target_lang, token).await;
        info!(
            target_lang,
            generation = token.generation(),
            translated = report.translated,
            cached = report.cached,
            failed = report.failed,
            skipped = report.skipped,
            superseded = report.superseded,
            "Tree translation pass finished"
        );
        report
    }

    /// Translate the string leaves of a structured value
    ///
    /// Strings go through the same cache-backed path as tree leaves; a
    /// string that fails to translate keeps its original text in place.
    pub async fn translate_value(
        &self,
        value: &serde_json::Value,
        target_lang: &str,
    ) -> (serde_json::Value, TranslationReport) {
        let mut texts = codec::extract(value);
        let report = self
            .run(texts.iter_mut().collect(), target_lang, &PassToken::detached())
            .await;
        debug!(
            target_lang,
            strings = texts.len(),
            failed = report.failed,
            "Structured value translated"
        );
        (codec::inject(value, &texts), report)
    }

    async fn run(
        &self,
        leaves: Vec<&mut String>,
        target_lang: &str,
        token: &PassToken,
    ) -> TranslationReport {
        let mut report = TranslationReport::default();

        // One group per distinct text, in order of first appearance
        let mut groups: Vec<LeafGroup<'_>> = Vec::new();
        let mut by_text: HashMap<String, usize> = HashMap::new();
        for leaf in leaves {
            if leaf.trim().is_empty() {
                report.record(LeafOutcome::Skipped);
                continue;
            }
            match by_text.get(leaf.as_str()).copied() {
                Some(index) => groups[index].leaves.push(leaf),
                None => {
                    by_text.insert(leaf.clone(), groups.len());
                    groups.push(LeafGroup {
                        text: leaf.clone(),
                        leaves: vec![leaf],
                    });
                }
            }
        }

        let outcomes: Vec<Vec<LeafOutcome>> = stream::iter(groups)
            .map(|group| self.translate_group(group, target_lang, token))
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        for outcome in outcomes.into_iter().flatten() {
            report.record(outcome);
        }
        report
    }

    /// Translate one distinct text and fill every leaf that carries it
    ///
    /// Only the first leaf of a group can count as `Translated`; the others
    /// are served by that result and count as `Cached`.
    async fn translate_group(
        &self,
        group: LeafGroup<'_>,
        target_lang: &str,
        token: &PassToken,
    ) -> Vec<LeafOutcome> {
        let (outcome, translation) = self.translate_text(&group.text, target_lang, token).await;
        let repeated = match outcome {
            LeafOutcome::Translated => LeafOutcome::Cached,
            other => other,
        };

        let mut outcomes = Vec::with_capacity(group.leaves.len());
        for (i, leaf) in group.leaves.into_iter().enumerate() {
            if let Some(translation) = &translation {
                leaf.clone_from(translation);
            }
            outcomes.push(if i == 0 { outcome } else { repeated });
        }
        outcomes
    }

    async fn translate_text(
        &self,
        text: &str,
        target_lang: &str,
        token: &PassToken,
    ) -> (LeafOutcome, Option<String>) {
        if !token.is_current() {
            return (LeafOutcome::Superseded, None);
        }

        match self.cache.get(text, target_lang) {
            Ok(Some(hit)) => return (LeafOutcome::Cached, Some(hit)),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Cache lookup failed, treating as miss"),
        }

        let call = self.provider.translate(text, &self.source_lang, target_lang);
        let result = match tokio::time::timeout(self.provider_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(MtError::ProviderUnavailable(format!(
                "{} did not answer within {:?}",
                self.provider.provider_name(),
                self.provider_timeout
            ))),
        };

        let translated = match result {
            Ok(translated) => translated,
            Err(e) => {
                warn!(
                    provider = self.provider.provider_name(),
                    target_lang,
                    error = %e,
                    "Leaf left untranslated"
                );
                return (LeafOutcome::Failed, None);
            }
        };

        // The translation is valid for this pair even if the pass is stale
        if let Err(e) = self.cache.put(text, target_lang, &translated) {
            warn!(error = %e, "Could not persist translation");
        }
        if !token.is_current() {
            return (LeafOutcome::Superseded, None);
        }
        (LeafOutcome::Translated, Some(translated))
    }
}

/// Leaves sharing one source text
struct LeafGroup<'a> {
    text: String,
    leaves: Vec<&'a mut String>,
}

impl std::fmt::Debug for TreeTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeTranslator")
            .field("provider", &self.provider.provider_name())
            .field("source_lang", &self.source_lang)
            .field("provider_timeout", &self.provider_timeout)
            .field("max_concurrency", &self.max_concurrency)
            .finish()
    }
}
