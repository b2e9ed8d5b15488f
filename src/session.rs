//! Selected-language state and the passes it triggers
//!
//! The session owns the page: the source-language tree as authored and the
//! live tree shown to the user. Changing the language persists the choice
//! and translates the live tree. Passes are serialized through an async
//! mutex on the page and each call takes a new generation; a pass that sees
//! a newer generation stops touching leaves, so the newest language wins.
//!
//! Every pass starts from the source text rather than from whatever the
//! previous pass left behind, so switching `fr` → `de` translates from the
//! source language, not from French.

use crate::mt::error::MtResult;
use crate::mt::translator::{same_language, validate_locale};
use crate::store::CacheStore;
use crate::tree::PresentationNode;
use crate::walker::{Generations, TranslationReport, TreeTranslator};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Store key holding the selected language code
pub const LANGUAGE_STORE_KEY: &str = "appLanguage";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Translating,
}

#[derive(Debug)]
struct Page {
    source: PresentationNode,
    live: PresentationNode,
}

impl Page {
    fn new(root: PresentationNode) -> Self {
        Self {
            source: root.clone(),
            live: root,
        }
    }

    fn restore_source(&mut self) {
        let source = self.source.texts();
        for (live, original) in self.live.texts_mut().into_iter().zip(source) {
            if live.as_str() != original {
                *live = original.to_string();
            }
        }
    }
}

pub struct LanguageSession {
    store: Arc<dyn CacheStore>,
    translator: TreeTranslator,
    page: Mutex<Page>,
    language: RwLock<String>,
    generations: Generations,
    active_passes: AtomicUsize,
    /// Language the live tree fully reflects, if any
    settled: StdMutex<Option<String>>,
}

impl LanguageSession {
    /// Start `Idle`, with the persisted language or `default_lang`
    ///
    /// `root` is taken to be in the translator's source language.
    pub fn new(
        store: Arc<dyn CacheStore>,
        translator: TreeTranslator,
        root: PresentationNode,
        default_lang: &str,
    ) -> Self {
        let language = match store.get(LANGUAGE_STORE_KEY) {
            Ok(Some(lang)) if validate_locale(&lang).is_ok() => lang,
            Ok(Some(lang)) => {
                warn!(lang = %lang, "Ignoring malformed stored language");
                default_lang.to_string()
            }
            Ok(None) => default_lang.to_string(),
            Err(e) => {
                warn!(error = %e, "Language preference unreadable, using default");
                default_lang.to_string()
            }
        };
        debug!(language = %language, "Language session started");

        Self {
            store,
            translator,
            page: Mutex::new(Page::new(root)),
            language: RwLock::new(language),
            generations: Generations::new(),
            active_passes: AtomicUsize::new(0),
            settled: StdMutex::new(None),
        }
    }

    pub fn language(&self) -> String {
        self.language
            .read()
            .map(|lang| lang.clone())
            .unwrap_or_default()
    }

    pub fn state(&self) -> SessionState {
        if self.active_passes.load(Ordering::SeqCst) > 0 {
            SessionState::Translating
        } else {
            SessionState::Idle
        }
    }

    pub fn translator(&self) -> &TreeTranslator {
        &self.translator
    }

    /// Copy of the live tree; waits for a running pass to let go
    pub async fn snapshot(&self) -> PresentationNode {
        self.page.lock().await.live.clone()
    }

    /// Swap in a new source-language page and translate it
    pub async fn replace_root(&self, root: PresentationNode) -> TranslationReport {
        // Supersede any running pass so it lets go of the page
        self.generations.begin();
        *self.page.lock().await = Page::new(root);
        self.translate_current().await
    }

    /// Switch to `lang`, persist it, and translate the page
    ///
    /// Selecting the current language does nothing and returns an empty
    /// report once a pass for it has completed without failures. Until
    /// then, for example after the provider was offline or when the
    /// language was restored from the store, the pass is run again. Only an
    /// invalid locale is an error; provider and cache failures stay inside
    /// the pass.
    pub async fn set_language(&self, lang: &str) -> MtResult<TranslationReport> {
        validate_locale(lang)?;

        let changed = match self.language.write() {
            Ok(mut current) if *current != lang => {
                *current = lang.to_string();
                true
            }
            Ok(_) => false,
            Err(_) => {
                warn!("Language lock poisoned, keeping previous selection");
                false
            }
        };
        if changed {
            if let Err(e) = self.store.set(LANGUAGE_STORE_KEY, lang) {
                warn!(error = %e, "Could not persist language preference");
            }
            info!(lang, "Language changed");
        } else if self.is_settled(lang) {
            debug!(lang, "Language unchanged, no pass needed");
            return Ok(TranslationReport::default());
        } else {
            debug!(lang, "Language unchanged, retrying incomplete pass");
        }
        Ok(self.run_pass(lang).await)
    }

    /// Translate the page into the current language, e.g. on first render
    pub async fn translate_current(&self) -> TranslationReport {
        let lang = self.language();
        self.run_pass(&lang).await
    }

    async fn run_pass(&self, lang: &str) -> TranslationReport {
        let token = self.generations.begin();
        let _active = ActivePass::enter(&self.active_passes);

        let mut page = self.page.lock().await;
        if !token.is_current() {
            debug!(lang, generation = token.generation(), "Pass superseded before start");
            return TranslationReport {
                superseded: true,
                ..TranslationReport::default()
            };
        }

        self.set_settled(None);
        page.restore_source();
        if same_language(lang, self.translator.source_lang()) {
            debug!(lang, "Target is the source language, source text restored");
            self.set_settled(Some(lang));
            return TranslationReport::default();
        }
        let report = self
            .translator
            .translate_with_token(&mut page.live, lang, &token)
            .await;
        if report.failed == 0 && !report.superseded && token.is_current() {
            self.set_settled(Some(lang));
        }
        report
    }

    fn is_settled(&self, lang: &str) -> bool {
        self.settled
            .lock()
            .map(|settled| settled.as_deref() == Some(lang))
            .unwrap_or(false)
    }

    fn set_settled(&self, lang: Option<&str>) {
        if let Ok(mut settled) = self.settled.lock() {
            *settled = lang.map(str::to_string);
        }
    }
}

impl std::fmt::Debug for LanguageSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageSession")
            .field("language", &self.language())
            .field("state", &self.state())
            .field("generation", &self.generations.current())
            .finish()
    }
}

/// Keeps the session `Translating` while alive
struct ActivePass<'a>(&'a AtomicUsize);

impl<'a> ActivePass<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        ActivePass(counter)
    }
}

impl Drop for ActivePass<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
