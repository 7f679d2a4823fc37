//! Unit tests for delivery helpers, tmux command lines and the memory backend

use std::path::Path;
use std::time::Duration;

use tmux_agent_bridge::terminal::config::{
    CHUNK_SIZE, PASTE_SETTLE_CAP, PASTE_SETTLE_FLOOR, chunk_text, paste_settle_delay,
};
use tmux_agent_bridge::terminal::tmux::TmuxCommand;
use tmux_agent_bridge::{Key, MemoryBackend, Reaction, SessionName, TerminalBackend};

#[test]
fn test_chunks_respect_char_boundaries() {
    let text = "ab✓cdé".repeat(30);
    let chunks = chunk_text(&text, CHUNK_SIZE);

    assert_eq!(chunks.concat(), text);
    assert!(chunks.iter().all(|c| c.chars().count() <= CHUNK_SIZE));
    assert_eq!(chunks.len(), 4);
    assert!(chunk_text("", CHUNK_SIZE).is_empty());
}

#[test]
fn test_paste_settle_delay_scales_and_caps() {
    assert_eq!(paste_settle_delay(0), PASTE_SETTLE_FLOOR);
    assert_eq!(paste_settle_delay(999), PASTE_SETTLE_FLOOR);
    assert_eq!(paste_settle_delay(4_000), Duration::from_millis(300));
    assert_eq!(paste_settle_delay(1_000_000), PASTE_SETTLE_CAP);
    assert_eq!(paste_settle_delay(usize::MAX), PASTE_SETTLE_CAP);
}

#[test]
fn test_tmux_commands_use_exact_targets() {
    let name = SessionName::new("agents_ab12_codex");

    assert_eq!(TmuxCommand::has_session(&name), ["has-session", "-t", "=agents_ab12_codex"]);
    assert_eq!(
        TmuxCommand::send_literal(&name, "-n not a flag"),
        ["send-keys", "-t", "=agents_ab12_codex:", "-l", "--", "-n not a flag"]
    );
    assert_eq!(
        TmuxCommand::send_key(&name, Key::CtrlC),
        ["send-keys", "-t", "=agents_ab12_codex:", "C-c"]
    );
    assert_eq!(
        TmuxCommand::capture_pane(&name, 1000),
        ["capture-pane", "-t", "=agents_ab12_codex:", "-p", "-S", "-1000"]
    );
    assert_eq!(
        TmuxCommand::new_session(&name, Path::new("/work")),
        ["new-session", "-d", "-s", "agents_ab12_codex", "-c", "/work"]
    );
}

#[test]
fn test_tmux_paste_goes_through_named_buffer() {
    let name = SessionName::new("agents_ab12_gemini_pro");

    assert_eq!(TmuxCommand::load_buffer("bridge_x"), ["load-buffer", "-b", "bridge_x", "-"]);
    assert_eq!(
        TmuxCommand::paste_buffer(&name, "bridge_x"),
        ["paste-buffer", "-p", "-b", "bridge_x", "-t", "=agents_ab12_gemini_pro:"]
    );
    assert_eq!(TmuxCommand::delete_buffer("bridge_x"), ["delete-buffer", "-b", "bridge_x"]);
}

#[tokio::test]
async fn test_memory_backend_echoes_and_reacts() {
    let backend = MemoryBackend::with_responder(|_, line| {
        if line == "ping" {
            Reaction::Print("pong".to_string())
        } else {
            Reaction::Nothing
        }
    });
    let name = SessionName::new("mem");

    backend.new_session(&name, Path::new("/tmp")).await.unwrap();
    backend.send_literal(&name, "pi").await.unwrap();
    backend.paste_bracketed(&name, "ng").await.unwrap();
    backend.send_key(&name, Key::Enter).await.unwrap();

    assert_eq!(backend.submitted(&name), vec!["ping".to_string()]);
    assert_eq!(backend.capture(&name, 10).await.unwrap(), "ping\npong");
    assert_eq!(backend.capture(&name, 1).await.unwrap(), "pong");
    assert_eq!(backend.work_dir(&name).as_deref(), Some(Path::new("/tmp")));
}

#[tokio::test]
async fn test_memory_backend_missing_session_errors() {
    let backend = MemoryBackend::new();
    let name = SessionName::new("ghost");

    assert!(!backend.has_session(&name).await);
    assert!(backend.kill_session(&name).await.is_err());
    assert!(backend.capture(&name, 10).await.is_err());
    assert!(backend.send_key(&name, Key::Enter).await.is_err());
}

#[tokio::test]
async fn test_memory_backend_exit_reaction_ends_session() {
    let backend = MemoryBackend::with_responder(|_, _| Reaction::Exit);
    let name = SessionName::new("short-lived");

    backend.new_session(&name, Path::new("/")).await.unwrap();
    backend.send_literal(&name, "anything").await.unwrap();
    backend.send_key(&name, Key::Enter).await.unwrap();

    assert!(!backend.has_session(&name).await);
    assert!(backend.live_sessions().is_empty());
}
