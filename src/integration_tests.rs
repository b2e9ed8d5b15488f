//! End-to-end tests for the cache, walker and session working together
//!
//! All tests use `MockTranslator`, so no network is required.

use crate::cache::{CACHE_STORE_KEY, TranslationCache};
use crate::codec;
use crate::mt::mock::{MockMode, MockTranslator};
use crate::session::{LANGUAGE_STORE_KEY, LanguageSession, SessionState};
use crate::store::{CacheStore, FileStore, MemoryStore};
use crate::tree::PresentationNode;
use crate::walker::TreeTranslator;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn hello_world() -> PresentationNode {
    PresentationNode::container(vec![
        PresentationNode::text("Hello"),
        PresentationNode::container(vec![
            PresentationNode::text("World"),
            PresentationNode::text(""),
        ]),
    ])
}

fn french_mock() -> MockTranslator {
    MockTranslator::with_mappings("fr", &[("Hello", "Bonjour"), ("World", "Monde")])
}

// ============================================================================
// Tree translation
// ============================================================================

#[tokio::test]
async fn test_hello_world_to_french() {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(TranslationCache::open(store.clone()));
    let mock = french_mock();
    let translator = TreeTranslator::new(Arc::new(mock.clone()), cache.clone());

    let mut tree = hello_world();
    let report = translator.translate(&mut tree, "fr").await;

    assert_eq!(
        tree,
        PresentationNode::container(vec![
            PresentationNode::text("Bonjour"),
            PresentationNode::container(vec![
                PresentationNode::text("Monde"),
                PresentationNode::text(""),
            ]),
        ])
    );
    assert!(tree.same_shape(&hello_world()));
    assert_eq!(report.translated, 2);
    assert_eq!(report.skipped, 1);

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get("Hello", "fr").unwrap(), Some("Bonjour".to_string()));
    assert_eq!(cache.get("World", "fr").unwrap(), Some("Monde".to_string()));

    let persisted: serde_json::Value =
        serde_json::from_str(&store.get(CACHE_STORE_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(persisted, json!({"Hello_fr": "Bonjour", "World_fr": "Monde"}));
}

#[tokio::test]
async fn test_repeated_pair_hits_provider_once() {
    let cache = Arc::new(TranslationCache::open(Arc::new(MemoryStore::new())));
    let mock = french_mock();
    let translator = TreeTranslator::new(Arc::new(mock.clone()), cache);

    let mut first = hello_world();
    translator.translate(&mut first, "fr").await;
    let mut second = hello_world();
    let report = translator.translate(&mut second, "fr").await;

    assert_eq!(first, second);
    assert_eq!(report.cached, 2);
    assert_eq!(report.translated, 0);
    assert_eq!(mock.requests(), vec!["Hello", "World"]);
}

#[tokio::test]
async fn test_duplicate_leaves_in_one_pass_share_cache() {
    let cache = Arc::new(TranslationCache::open(Arc::new(MemoryStore::new())));
    let mock = french_mock();
    let translator = TreeTranslator::new(Arc::new(mock.clone()), cache);

    let mut tree = PresentationNode::container(vec![
        PresentationNode::text("Hello"),
        PresentationNode::text("Hello"),
    ]);
    let report = translator.translate(&mut tree, "fr").await;
    assert_eq!(tree.texts(), vec!["Bonjour", "Bonjour"]);
    assert_eq!(report.translated, 1);
    assert_eq!(report.cached, 1);
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_failed_leaf_is_isolated() {
    let fail: HashSet<String> = ["Hello".to_string()].into_iter().collect();
    let cache = Arc::new(TranslationCache::open(Arc::new(MemoryStore::new())));
    let translator = TreeTranslator::new(
        Arc::new(MockTranslator::new(MockMode::FailOn(fail))),
        cache.clone(),
    );

    let mut tree = hello_world();
    let report = translator.translate(&mut tree, "fr").await;

    assert_eq!(tree.texts(), vec!["Hello", "World_fr", ""]);
    assert_eq!(report.failed, 1);
    assert_eq!(report.translated, 1);
    assert_eq!(cache.get("Hello", "fr").unwrap(), None);
}

#[tokio::test]
async fn test_cache_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("leafy.json");

    {
        let cache = Arc::new(TranslationCache::open(Arc::new(FileStore::new(&path))));
        let translator = TreeTranslator::new(Arc::new(french_mock()), cache);
        let mut tree = hello_world();
        translator.translate(&mut tree, "fr").await;
    }

    // A provider that always fails proves the second run is served from disk
    let cache = Arc::new(TranslationCache::open(Arc::new(FileStore::new(&path))));
    let offline = MockTranslator::new(MockMode::Error("offline".to_string()));
    let translator = TreeTranslator::new(Arc::new(offline.clone()), cache);
    let mut tree = hello_world();
    let report = translator.translate(&mut tree, "fr").await;

    assert_eq!(tree.texts(), vec!["Bonjour", "Monde", ""]);
    assert_eq!(report.cached, 2);
    assert_eq!(offline.call_count(), 0);
}

#[tokio::test]
async fn test_corrupt_store_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("leafy.json");
    std::fs::write(&path, "this is not json").unwrap();

    let cache = Arc::new(TranslationCache::open(Arc::new(FileStore::new(&path))));
    assert!(cache.is_empty());

    let translator = TreeTranslator::new(Arc::new(french_mock()), cache);
    let mut tree = hello_world();
    let report = translator.translate(&mut tree, "fr").await;
    assert_eq!(report.translated, 2);

    let reopened = TranslationCache::open(Arc::new(FileStore::new(&path)));
    assert_eq!(reopened.len(), 2);
}

// ============================================================================
// Structured payloads
// ============================================================================

#[tokio::test]
async fn test_structured_payload_shares_cache_with_tree() {
    let cache = Arc::new(TranslationCache::open(Arc::new(MemoryStore::new())));
    let mock = french_mock();
    let translator = TreeTranslator::new(Arc::new(mock.clone()), cache);

    let mut tree = hello_world();
    translator.translate(&mut tree, "fr").await;

    let payload = json!({"greeting": "Hello", "details": [{"label": "World", "count": 2}]});
    let (translated, report) = translator.translate_value(&payload, "fr").await;

    assert_eq!(
        translated,
        json!({"greeting": "Bonjour", "details": [{"label": "Monde", "count": 2}]})
    );
    assert_eq!(report.cached, 2);
    assert_eq!(mock.call_count(), 2);
    assert_eq!(codec::extract(&translated), vec!["Bonjour", "Monde"]);
}

// ============================================================================
// Language session
// ============================================================================

#[tokio::test]
async fn test_session_end_to_end() {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(TranslationCache::open(store.clone()));
    let translator = TreeTranslator::new(Arc::new(french_mock()), cache);
    let session = LanguageSession::new(store.clone(), translator, hello_world(), "en");

    let report = session.set_language("fr").await.unwrap();
    assert_eq!(report.translated, 2);
    assert_eq!(session.snapshot().await.texts(), vec!["Bonjour", "Monde", ""]);
    assert_eq!(store.get(LANGUAGE_STORE_KEY).unwrap(), Some("fr".to_string()));

    // A new session over the same store resumes the preference and the cache
    let cache = Arc::new(TranslationCache::open(store.clone()));
    let offline = MockTranslator::new(MockMode::Error("offline".to_string()));
    let translator = TreeTranslator::new(Arc::new(offline.clone()), cache);
    let resumed = LanguageSession::new(store, translator, hello_world(), "en");
    assert_eq!(resumed.language(), "fr");

    let report = resumed.translate_current().await;
    assert_eq!(report.cached, 2);
    assert_eq!(offline.call_count(), 0);
}

#[tokio::test]
async fn test_newer_language_supersedes_running_pass() {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(TranslationCache::open(store.clone()));
    let slow = MockTranslator::with_delay(MockMode::Suffix, 40);
    let translator = TreeTranslator::new(Arc::new(slow.clone()), cache);
    let page = PresentationNode::container(vec![
        PresentationNode::text("one"),
        PresentationNode::text("two"),
        PresentationNode::text("three"),
    ]);
    let session = LanguageSession::new(store, translator, page, "en");

    let (first, second) = tokio::join!(session.set_language("fr"), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(session.state(), SessionState::Translating);
        session.set_language("de").await
    });

    let first = first.unwrap();
    let second = second.unwrap();
    assert!(first.superseded);
    assert!(first.updated() < 3);
    assert!(!second.superseded);
    assert_eq!(session.snapshot().await.texts(), vec!["one_de", "two_de", "three_de"]);
    assert_eq!(session.language(), "de");
    assert_eq!(session.state(), SessionState::Idle);
}
