//! Terminal backend layer
//!
//! This module provides the backend abstraction the session manager drives,
//! plus two implementations: [`TmuxBackend`] talks to a real tmux server and
//! [`MemoryBackend`] keeps scripted sessions in process.

pub mod config;
pub mod memory;
pub mod tmux;

use std::future::Future;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::SessionName;

pub use memory::{MemoryBackend, Reaction};
pub use tmux::TmuxBackend;

/// Single control keystroke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    /// Submit
    Enter,
    /// Leave a sub-mode
    Escape,
    /// Interrupt
    CtrlC,
}

impl Key {
    /// Key name understood by tmux `send-keys`
    #[must_use]
    pub fn tmux_name(self) -> &'static str {
        match self {
            Self::Enter => "Enter",
            Self::Escape => "Escape",
            Self::CtrlC => "C-c",
        }
    }
}

/// How text is delivered into a terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectionStrategy {
    /// One literal line followed by Enter
    Line,
    /// One bracketed paste followed by Enter after a length-scaled settle delay
    BulkPaste,
    /// Small literal chunks typed below the paste-detection threshold, then Enter
    ChunkedTyping,
}

/// Terminal multiplexer operations the session manager relies on
///
/// Implementations address sessions by exact name. None of the methods check
/// the session registry; liveness checks are the manager's job.
pub trait TerminalBackend: Send + Sync {
    /// Whether a session with this exact name is alive
    fn has_session(&self, name: &SessionName) -> impl Future<Output = bool> + Send;

    /// Open a detached session bound to `work_dir`
    ///
    /// # Errors
    /// Returns error if the backend refuses to create the session
    fn new_session(
        &self,
        name: &SessionName,
        work_dir: &Path,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Terminate a session
    ///
    /// # Errors
    /// Returns error if the session does not exist or cannot be killed
    fn kill_session(&self, name: &SessionName) -> impl Future<Output = Result<()>> + Send;

    /// Type text literally, without interpreting key names
    ///
    /// # Errors
    /// Returns error if the delivery command fails
    fn send_literal(&self, name: &SessionName, text: &str)
    -> impl Future<Output = Result<()>> + Send;

    /// Send a single control key
    ///
    /// # Errors
    /// Returns error if the delivery command fails
    fn send_key(&self, name: &SessionName, key: Key) -> impl Future<Output = Result<()>> + Send;

    /// Paste text as one bracketed unit through a transient buffer
    ///
    /// # Errors
    /// Returns error if loading or pasting the buffer fails
    fn paste_bracketed(
        &self,
        name: &SessionName,
        text: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Last `lines` lines of rendered output
    ///
    /// # Errors
    /// Returns error if the capture command fails
    fn capture(&self, name: &SessionName, lines: usize)
    -> impl Future<Output = Result<String>> + Send;
}
