//! Unit tests for `SessionManager`
//!
//! Tests session lifecycle, cache reconciliation and the injection strategies

mod common;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tmux_agent_bridge::{
    BridgeError, InjectionStrategy, Key, MemoryBackend, SessionLease, SessionManager, SessionName,
};

fn launch() -> Vec<String> {
    vec![common::ECHO_AGENT.to_string()]
}

#[tokio::test(start_paused = true)]
async fn test_exists_follows_create_and_destroy() {
    common::init_logging();
    let manager = SessionManager::new(common::echo_backend());
    let name = SessionName::new("agents_test_alpha");

    assert!(!manager.exists(&name).await);

    let session = manager.create(&name, Path::new("/work"), &launch()).await.unwrap();
    assert_eq!(session.created_at, session.last_activity);
    assert!(manager.exists(&name).await);
    assert_eq!(manager.backend().submitted(&name), launch());
    assert_eq!(manager.backend().work_dir(&name).as_deref(), Some(Path::new("/work")));

    manager.destroy(&name).await.unwrap();
    assert!(!manager.exists(&name).await);
    assert!(manager.get(&name).is_none());

    // Idempotent
    manager.destroy(&name).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_create_replaces_live_session() {
    let manager = SessionManager::new(common::echo_backend());
    let name = SessionName::new("agents_test_reused");

    manager.create(&name, Path::new("/a"), &launch()).await.unwrap();
    manager
        .inject(&name, "leftover", InjectionStrategy::Line)
        .await
        .unwrap();

    manager.create(&name, Path::new("/b"), &launch()).await.unwrap();
    assert_eq!(manager.backend().submitted(&name), launch());
    assert_eq!(manager.backend().work_dir(&name).as_deref(), Some(Path::new("/b")));
    assert_eq!(manager.sessions().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_vanished_session_is_dropped_from_cache() {
    let manager = SessionManager::new(common::echo_backend());
    let name = SessionName::new("agents_test_gone");

    manager.create(&name, Path::new("/"), &launch()).await.unwrap();
    assert!(manager.get(&name).is_some());

    manager.backend().terminate(&name);
    assert!(!manager.exists(&name).await);
    assert!(manager.get(&name).is_none());

    let err = manager.capture_screen(&name).await.unwrap_err();
    assert!(matches!(err, BridgeError::SessionNotFound(_)));

    let err = manager
        .inject(&name, "hello", InjectionStrategy::BulkPaste)
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::SessionNotFound(_)));

    let err = manager.send_key(&name, Key::Escape).await.unwrap_err();
    assert!(matches!(err, BridgeError::SessionNotFound(_)));
}

#[tokio::test(start_paused = true)]
async fn test_injection_strategies_deliver_whole_text() {
    let manager = SessionManager::new(MemoryBackend::new());
    let name = SessionName::new("agents_test_typing");
    manager.create(&name, Path::new("/"), &launch()).await.unwrap();

    let long = "x".repeat(120) + " ✓ done";
    for strategy in [
        InjectionStrategy::Line,
        InjectionStrategy::BulkPaste,
        InjectionStrategy::ChunkedTyping,
    ] {
        manager.inject(&name, &long, strategy).await.unwrap();
    }

    let submitted = manager.backend().submitted(&name);
    assert_eq!(submitted.len(), 4);
    assert!(submitted[1..].iter().all(|line| line == &long));

    let enters = manager
        .backend()
        .sent_keys(&name)
        .into_iter()
        .filter(|k| *k == Key::Enter)
        .count();
    assert_eq!(enters, 4);
}

#[tokio::test(start_paused = true)]
async fn test_bulk_paste_waits_for_settle_delay() {
    let manager = SessionManager::new(MemoryBackend::new());
    let name = SessionName::new("agents_test_paste");
    manager.create(&name, Path::new("/"), &launch()).await.unwrap();

    let started = tokio::time::Instant::now();
    manager
        .inject(&name, &"y".repeat(5_000), InjectionStrategy::BulkPaste)
        .await
        .unwrap();
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(350), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(400), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_failed_delivery_surfaces_injection_failed() {
    let manager = SessionManager::new(MemoryBackend::new());
    let name = SessionName::new("agents_test_refused");
    manager.create(&name, Path::new("/"), &launch()).await.unwrap();
    let before = manager.get(&name).unwrap().last_activity;

    manager.backend().set_fail_injections(true);
    let err = manager
        .inject(&name, "hello", InjectionStrategy::ChunkedTyping)
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::InjectionFailed { .. }));
    assert_eq!(manager.get(&name).unwrap().last_activity, before);

    manager.backend().set_fail_injections(false);
    manager.inject(&name, "hello", InjectionStrategy::Line).await.unwrap();
    assert!(manager.get(&name).unwrap().last_activity >= before);
}

#[tokio::test(start_paused = true)]
async fn test_failed_launch_kills_half_made_session() {
    let backend = MemoryBackend::new();
    backend.set_fail_injections(true);
    let manager = SessionManager::new(backend);
    let name = SessionName::new("agents_test_nolaunch");

    let err = manager.create(&name, Path::new("/"), &launch()).await.unwrap_err();
    assert!(matches!(err, BridgeError::InjectionFailed { .. }));
    assert!(manager.backend().live_sessions().is_empty());
    assert!(manager.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_destroy_all_clears_everything() {
    let manager = SessionManager::new(MemoryBackend::new());
    for i in 0..3 {
        let name = SessionName::new(format!("agents_test_{i}"));
        manager.create(&name, Path::new("/"), &launch()).await.unwrap();
    }

    assert_eq!(manager.destroy_all().await, 3);
    assert!(manager.is_empty());
    assert!(manager.backend().live_sessions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_lease_release_and_drop_destroy_session() {
    let manager = Arc::new(SessionManager::new(MemoryBackend::new()));
    let released = SessionName::new("agents_test_lease_a");
    let dropped = SessionName::new("agents_test_lease_b");
    manager.create(&released, Path::new("/"), &launch()).await.unwrap();
    manager.create(&dropped, Path::new("/"), &launch()).await.unwrap();

    let lease = SessionLease::new(Arc::clone(&manager), released.clone());
    assert_eq!(lease.name(), &released);
    lease.release().await.unwrap();
    assert!(!manager.exists(&released).await);

    drop(SessionLease::new(Arc::clone(&manager), dropped.clone()));
    tokio::task::yield_now().await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!manager.exists(&dropped).await);
}
