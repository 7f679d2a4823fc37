//! tmux backend
//!
//! Every operation is one `tmux` invocation (three for a bracketed paste).
//! Sessions are addressed with tmux's exact-match `=` prefix so that
//! `agents_ab12_codex` never resolves to `agents_ab12_codex_medium`.

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use uuid::Uuid;

use crate::error::{BridgeError, Result};
use crate::types::SessionName;

use super::{Key, TerminalBackend};

/// Argument vectors for the tmux commands the backend runs
pub struct TmuxCommand;

impl TmuxCommand {
    /// Exact-match session target
    #[must_use]
    pub fn session_target(name: &SessionName) -> String {
        format!("={name}")
    }

    /// Exact-match pane target (active pane of the session's current window)
    #[must_use]
    pub fn pane_target(name: &SessionName) -> String {
        format!("={name}:")
    }

    /// `tmux has-session`
    #[must_use]
    pub fn has_session(name: &SessionName) -> Vec<String> {
        vec![
            "has-session".into(),
            "-t".into(),
            Self::session_target(name),
        ]
    }

    /// `tmux new-session -d`
    #[must_use]
    pub fn new_session(name: &SessionName, work_dir: &Path) -> Vec<String> {
        vec![
            "new-session".into(),
            "-d".into(),
            "-s".into(),
            name.to_string(),
            "-c".into(),
            work_dir.to_string_lossy().into_owned(),
        ]
    }

    /// `tmux kill-session`
    #[must_use]
    pub fn kill_session(name: &SessionName) -> Vec<String> {
        vec![
            "kill-session".into(),
            "-t".into(),
            Self::session_target(name),
        ]
    }

    /// `tmux send-keys -l` (literal text)
    #[must_use]
    pub fn send_literal(name: &SessionName, text: &str) -> Vec<String> {
        vec![
            "send-keys".into(),
            "-t".into(),
            Self::pane_target(name),
            "-l".into(),
            "--".into(),
            text.to_string(),
        ]
    }

    /// `tmux send-keys` (named key)
    #[must_use]
    pub fn send_key(name: &SessionName, key: Key) -> Vec<String> {
        vec![
            "send-keys".into(),
            "-t".into(),
            Self::pane_target(name),
            key.tmux_name().into(),
        ]
    }

    /// `tmux load-buffer` reading the buffer body from stdin
    #[must_use]
    pub fn load_buffer(buffer: &str) -> Vec<String> {
        vec![
            "load-buffer".into(),
            "-b".into(),
            buffer.to_string(),
            "-".into(),
        ]
    }

    /// `tmux paste-buffer -p` (bracketed paste)
    #[must_use]
    pub fn paste_buffer(name: &SessionName, buffer: &str) -> Vec<String> {
        vec![
            "paste-buffer".into(),
            "-p".into(),
            "-b".into(),
            buffer.to_string(),
            "-t".into(),
            Self::pane_target(name),
        ]
    }

    /// `tmux delete-buffer`
    #[must_use]
    pub fn delete_buffer(buffer: &str) -> Vec<String> {
        vec!["delete-buffer".into(), "-b".into(), buffer.to_string()]
    }

    /// `tmux capture-pane -p -S -<lines>`
    #[must_use]
    pub fn capture_pane(name: &SessionName, lines: usize) -> Vec<String> {
        vec![
            "capture-pane".into(),
            "-t".into(),
            Self::pane_target(name),
            "-p".into(),
            "-S".into(),
            format!("-{lines}"),
        ]
    }
}

/// Terminal backend driving a tmux server through its CLI
#[derive(Debug, Clone)]
pub struct TmuxBackend {
    tmux_path: PathBuf,
}

impl TmuxBackend {
    /// Locate `tmux` on `PATH`
    ///
    /// # Errors
    /// Returns `BackendUnavailable` if tmux is not installed
    pub fn new() -> Result<Self> {
        let tmux_path = which::which("tmux").map_err(|e| {
            BridgeError::BackendUnavailable(format!("tmux not found on PATH: {e}"))
        })?;
        log::debug!("Using tmux at {}", tmux_path.display());
        Ok(Self { tmux_path })
    }

    /// Use an explicit tmux binary
    pub fn with_path(tmux_path: impl Into<PathBuf>) -> Self {
        Self {
            tmux_path: tmux_path.into(),
        }
    }

    /// Path of the tmux binary in use
    #[must_use]
    pub fn tmux_path(&self) -> &Path {
        &self.tmux_path
    }

    async fn output(&self, args: &[String]) -> Result<Output> {
        Command::new(&self.tmux_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| BridgeError::backend(format!("failed to run tmux {}: {e}", args[0])))
    }

    async fn run(&self, args: Vec<String>) -> Result<String> {
        let output = self.output(&args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BridgeError::backend(format!(
                "tmux {} failed: {}",
                args[0],
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn load_buffer(&self, buffer: &str, text: &str) -> Result<()> {
        let args = TmuxCommand::load_buffer(buffer);
        let mut child = Command::new(&self.tmux_path)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| BridgeError::backend(format!("failed to run tmux load-buffer: {e}")))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| BridgeError::backend("Failed to get load-buffer stdin handle"))?;
        stdin.write_all(text.as_bytes()).await?;
        stdin.shutdown().await?;
        drop(stdin);

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BridgeError::backend(format!(
                "tmux load-buffer failed: {}",
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl TerminalBackend for TmuxBackend {
    async fn has_session(&self, name: &SessionName) -> bool {
        match self.output(&TmuxCommand::has_session(name)).await {
            Ok(output) => output.status.success(),
            Err(e) => {
                log::warn!("[{name}] has-session failed: {e}");
                false
            }
        }
    }

    async fn new_session(&self, name: &SessionName, work_dir: &Path) -> Result<()> {
        self.run(TmuxCommand::new_session(name, work_dir)).await?;
        Ok(())
    }

    async fn kill_session(&self, name: &SessionName) -> Result<()> {
        self.run(TmuxCommand::kill_session(name)).await?;
        Ok(())
    }

    async fn send_literal(&self, name: &SessionName, text: &str) -> Result<()> {
        self.run(TmuxCommand::send_literal(name, text)).await?;
        Ok(())
    }

    async fn send_key(&self, name: &SessionName, key: Key) -> Result<()> {
        self.run(TmuxCommand::send_key(name, key)).await?;
        Ok(())
    }

    async fn paste_bracketed(&self, name: &SessionName, text: &str) -> Result<()> {
        let mut buffer = Uuid::new_v4().simple().to_string();
        buffer.truncate(12);
        let buffer = format!("bridge_{buffer}");

        self.load_buffer(&buffer, text).await?;
        let pasted = self.run(TmuxCommand::paste_buffer(name, &buffer)).await;

        if let Err(e) = self.run(TmuxCommand::delete_buffer(&buffer)).await {
            log::debug!("[{name}] delete-buffer {buffer} failed: {e}");
        }

        pasted.map(|_| ())
    }

    async fn capture(&self, name: &SessionName, lines: usize) -> Result<String> {
        self.run(TmuxCommand::capture_pane(name, lines)).await
    }
}
