//! Tests for the inactivity reaper

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tmux_agent_bridge::manager::spawn_reaper;
use tmux_agent_bridge::{MemoryBackend, SessionManager, SessionName};

async fn manager_with(names: &[&str]) -> SessionManager<MemoryBackend> {
    let manager = SessionManager::new(MemoryBackend::new());
    for name in names {
        manager
            .create(&SessionName::new(*name), Path::new("/"), &["agent".to_string()])
            .await
            .unwrap();
    }
    manager
}

#[tokio::test]
async fn test_idle_sessions_are_destroyed() {
    let manager = manager_with(&["agents_r_a", "agents_r_b"]).await;
    let threshold = Duration::from_secs(30 * 60);

    let reaped = manager
        .reap_idle_at(Utc::now() + chrono::Duration::minutes(31), threshold)
        .await;

    assert_eq!(reaped.len(), 2);
    assert!(manager.is_empty());
    assert!(manager.backend().live_sessions().is_empty());
}

#[tokio::test]
async fn test_recent_activity_keeps_session() {
    let manager = manager_with(&["agents_r_busy"]).await;
    let threshold = Duration::from_secs(30 * 60);

    let reaped = manager
        .reap_idle_at(Utc::now() + chrono::Duration::minutes(10), threshold)
        .await;

    assert!(reaped.is_empty());
    assert_eq!(manager.len(), 1);
}

#[tokio::test]
async fn test_vanished_session_is_dropped_quietly() {
    let manager = manager_with(&["agents_r_gone"]).await;
    manager.backend().terminate(&SessionName::new("agents_r_gone"));

    let reaped = manager
        .reap_idle_at(Utc::now() + chrono::Duration::hours(1), Duration::from_secs(60))
        .await;

    assert_eq!(reaped.len(), 1);
    assert!(manager.is_empty());
}

#[tokio::test]
async fn test_background_reaper_runs_periodically() {
    let manager = Arc::new(manager_with(&["agents_r_bg"]).await);

    let handle = spawn_reaper(
        Arc::clone(&manager),
        Duration::from_millis(50),
        Duration::from_millis(1),
    );
    tokio::time::sleep(Duration::from_millis(200)).await;
    handle.abort();

    assert!(manager.is_empty());
    assert!(manager.backend().live_sessions().is_empty());
}

#[tokio::test]
async fn test_busy_session_is_never_reaped() {
    let manager = manager_with(&["agents_r_busy_long"]).await;
    let name = SessionName::new("agents_r_busy_long");
    let later = Utc::now() + chrono::Duration::hours(2);
    let threshold = Duration::from_secs(30 * 60);

    let first = manager.begin_request(&name);
    let second = manager.begin_request(&name);
    assert_eq!(manager.in_flight(&name), 2);
    assert!(manager.reap_idle_at(later, threshold).await.is_empty());

    drop(first);
    assert_eq!(manager.in_flight(&name), 1);
    assert!(manager.reap_idle_at(later, threshold).await.is_empty());

    drop(second);
    assert_eq!(manager.in_flight(&name), 0);
    assert_eq!(manager.reap_idle_at(later, threshold).await, vec![name]);
}
