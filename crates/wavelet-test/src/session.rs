//! # Session Scenarios
//!
//! Persistence and launch planning across simulated restarts. Each
//! "restart" builds a fresh [`Session`] over the same store, which is
//! what actually happens when the hosting process relaunches.

use std::sync::Arc;

use url::Url;

use wavelet_core::config::ShellConfig;
use wavelet_session::store::keys;
use wavelet_session::{
    build_launch_plan, CookieJar, CookieRecord, MemoryStore, PreferenceStore, Session,
};

fn config() -> ShellConfig {
    ShellConfig::new(Url::parse("https://app.example.com/start").unwrap())
}

fn jar_with_one_cookie() -> CookieJar {
    let mut jar = CookieJar::new();
    jar.upsert(CookieRecord {
        name: "sid".to_string(),
        value: "abc123".to_string(),
        domain: "app.example.com".to_string(),
        path: "/".to_string(),
        secure: true,
        http_only: true,
        expires: Some(1_900_000_000),
    });
    jar
}

/// Test that everything a session persists survives a restart.
#[test]
fn test_session_survives_restart() {
    let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());

    let session = Session::new(store.clone());
    assert!(session.is_first_open());
    session.mark_opened().unwrap();
    session.set_last_visited("https://app.example.com/lobby").unwrap();
    session.save_cookie_jar(&jar_with_one_cookie()).unwrap();
    drop(session);

    let session = Session::new(store);
    assert!(!session.is_first_open());
    assert_eq!(
        session.last_visited().as_deref(),
        Some("https://app.example.com/lobby")
    );
    assert_eq!(session.cookie_jar(), jar_with_one_cookie());
}

/// Test that the launch plan follows what the session knows.
#[test]
fn test_launch_follows_the_session() {
    let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
    let session = Session::new(store);
    let config = config();

    let plan = build_launch_plan(&config, session.last_visited().as_deref(), None);
    assert_eq!(plan.method.as_str(), "POST");
    assert!(!plan.resumed);
    assert_eq!(plan.url, config.landing_url);

    session.set_last_visited("https://app.example.com/game/7").unwrap();
    let plan = build_launch_plan(&config, session.last_visited().as_deref(), None);
    assert_eq!(plan.method.as_str(), "GET");
    assert!(plan.resumed);
    assert_eq!(plan.url.as_str(), "https://app.example.com/game/7");
}

/// Test that a corrupt cookie blob restores as an empty jar instead of
/// failing the session.
#[test]
fn test_corrupt_cookie_blob_restores_empty() {
    let store = MemoryStore::new();
    store.set(keys::COOKIES, "%%% not a blob %%%").unwrap();

    let session = Session::new(Arc::new(store));
    assert!(session.cookie_jar().is_empty());
}

/// Test that the persisted cookie snapshot is opaque to the store.
#[test]
fn test_cookie_blob_is_opaque_to_the_store() {
    let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
    let session = Session::new(store.clone());
    session.save_cookie_jar(&jar_with_one_cookie()).unwrap();

    let raw = store.get(keys::COOKIES).unwrap();
    assert!(!raw.contains('{'), "cookie fields must not leak into the store");
    assert!(!raw.contains("sid"));
}

/// Test that clearing the resume key sends the next launch back to the
/// landing URL.
#[test]
fn test_cleared_resume_key_starts_over() {
    let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
    let session = Session::new(store.clone());
    session.set_last_visited("https://app.example.com/lobby").unwrap();

    store.remove(keys::LAST_VISITED).unwrap();
    let plan = build_launch_plan(&config(), session.last_visited().as_deref(), None);
    assert!(!plan.resumed);
}
