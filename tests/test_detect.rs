//! Unit tests for readiness detection

mod common;

use std::path::Path;
use std::time::Duration;

use tmux_agent_bridge::detect::{ReadinessProbe, await_pattern};
use tmux_agent_bridge::{BridgeError, Key, MemoryBackend, SessionManager, SessionName};

fn launch() -> Vec<String> {
    vec![common::ECHO_AGENT.to_string()]
}

#[tokio::test(start_paused = true)]
async fn test_ready_after_one_second() {
    common::init_logging();
    let manager = SessionManager::new(MemoryBackend::new());
    let name = SessionName::new("agents_test_slow");
    manager.create(&name, Path::new("/"), &launch()).await.unwrap();

    let backend = manager.backend().clone();
    let printer = name.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        backend.print(&printer, "READY");
    });

    let started = tokio::time::Instant::now();
    await_pattern(&manager, &name, &["READY".to_string()], Duration::from_secs(5))
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(1500), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_any_pattern_matches() {
    let manager = SessionManager::new(MemoryBackend::new());
    let name = SessionName::new("agents_test_any");
    manager.create(&name, Path::new("/"), &launch()).await.unwrap();
    manager.backend().print(&name, "Model: gemini-3-pro");

    let probe = ReadinessProbe::new(vec!["YOLO mode", "Type your message", "Model:"]);
    let matched = probe.wait(&manager, &name, Duration::from_secs(1)).await.unwrap();
    assert_eq!(matched, "Model:");
}

#[tokio::test(start_paused = true)]
async fn test_ready_timeout() {
    let manager = SessionManager::new(MemoryBackend::new());
    let name = SessionName::new("agents_test_never");
    manager.create(&name, Path::new("/"), &launch()).await.unwrap();

    let started = tokio::time::Instant::now();
    let err = await_pattern(&manager, &name, &["READY".to_string()], Duration::from_secs(2))
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::ReadyTimeout { timeout_ms: 2000, .. }));
    assert!(started.elapsed() >= Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_vanishing_session_aborts_wait() {
    let manager = SessionManager::new(MemoryBackend::new());
    let name = SessionName::new("agents_test_vanish");
    manager.create(&name, Path::new("/"), &launch()).await.unwrap();

    let backend = manager.backend().clone();
    let victim = name.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        backend.terminate(&victim);
    });

    let err = await_pattern(&manager, &name, &["READY".to_string()], Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::SessionNotFound(_)));
}

#[tokio::test(start_paused = true)]
async fn test_interactive_prompt_is_dismissed() {
    let backend = MemoryBackend::with_responder(|_, line| {
        if line.is_empty() {
            tmux_agent_bridge::Reaction::Print("READY".to_string())
        } else {
            tmux_agent_bridge::Reaction::Print("Do you trust the files in this folder?".to_string())
        }
    });
    let manager = SessionManager::new(backend);
    let name = SessionName::new("agents_test_trust");
    manager.create(&name, Path::new("/"), &launch()).await.unwrap();

    let probe = ReadinessProbe::new(vec!["READY"])
        .with_dismiss_prompts(vec!["Do you trust the files in this folder?"]);
    probe.wait(&manager, &name, Duration::from_secs(5)).await.unwrap();

    let keys = manager.backend().sent_keys(&name);
    assert_eq!(keys, vec![Key::Enter, Key::Enter]);
}
