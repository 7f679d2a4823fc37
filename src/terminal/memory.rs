//! In-process terminal backend
//!
//! Sessions are plain screen buffers. Text typed or pasted accumulates as
//! pending input; Enter moves it to the screen as an echoed line and hands it
//! to an optional responder, which decides what the "program" prints next.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::error::{BridgeError, Result};
use crate::types::SessionName;

use super::{Key, TerminalBackend};

/// What the scripted program does after a line is submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    /// Nothing visible happens
    Nothing,
    /// Print text (may span several lines)
    Print(String),
    /// The program exits and takes the session with it
    Exit,
}

/// Callback invoked for every submitted line
pub type Responder = Arc<dyn Fn(&SessionName, &str) -> Reaction + Send + Sync>;

#[derive(Debug, Default)]
struct MemorySession {
    work_dir: PathBuf,
    screen: Vec<String>,
    input: String,
    submitted: Vec<String>,
    keys: Vec<Key>,
}

impl MemorySession {
    fn print(&mut self, text: &str) {
        self.screen.extend(text.lines().map(str::to_string));
    }
}

struct Inner {
    sessions: Mutex<HashMap<SessionName, MemorySession>>,
    responder: Option<Responder>,
    fail_injections: AtomicBool,
}

/// Scripted terminal backend, cheap to clone (clones share state)
#[derive(Clone)]
pub struct MemoryBackend {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("sessions", &self.live_sessions())
            .field("responder", &self.inner.responder.is_some())
            .finish()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Backend whose sessions never react to input
    #[must_use]
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Backend calling `responder` for each submitted line
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&SessionName, &str) -> Reaction + Send + Sync + 'static,
    {
        Self::build(Some(Arc::new(responder)))
    }

    fn build(responder: Option<Responder>) -> Self {
        Self {
            inner: Arc::new(Inner {
                sessions: Mutex::new(HashMap::new()),
                responder,
                fail_injections: AtomicBool::new(false),
            }),
        }
    }

    /// Append program output to a session's screen; FALSE if the session is gone
    pub fn print(&self, name: &SessionName, text: &str) -> bool {
        match self.inner.sessions.lock().get_mut(name) {
            Some(session) => {
                session.print(text);
                true
            }
            None => false,
        }
    }

    /// Simulate the program (or a human) ending the session
    pub fn terminate(&self, name: &SessionName) -> bool {
        self.inner.sessions.lock().remove(name).is_some()
    }

    /// Lines submitted with Enter so far
    #[must_use]
    pub fn submitted(&self, name: &SessionName) -> Vec<String> {
        self.inner
            .sessions
            .lock()
            .get(name)
            .map(|s| s.submitted.clone())
            .unwrap_or_default()
    }

    /// Control keys received so far, Enter included
    #[must_use]
    pub fn sent_keys(&self, name: &SessionName) -> Vec<Key> {
        self.inner
            .sessions
            .lock()
            .get(name)
            .map(|s| s.keys.clone())
            .unwrap_or_default()
    }

    /// Working directory a session was opened in
    #[must_use]
    pub fn work_dir(&self, name: &SessionName) -> Option<PathBuf> {
        self.inner
            .sessions
            .lock()
            .get(name)
            .map(|s| s.work_dir.clone())
    }

    /// Names of all live sessions, sorted
    #[must_use]
    pub fn live_sessions(&self) -> Vec<SessionName> {
        let mut names: Vec<SessionName> = self.inner.sessions.lock().keys().cloned().collect();
        names.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        names
    }

    /// Make every literal or paste delivery fail
    pub fn set_fail_injections(&self, fail: bool) {
        self.inner.fail_injections.store(fail, Ordering::SeqCst);
    }

    fn check_injection(&self, name: &SessionName) -> Result<()> {
        if self.inner.fail_injections.load(Ordering::SeqCst) {
            return Err(BridgeError::backend(format!("injection into {name} refused")));
        }
        Ok(())
    }

    fn with_session<T>(
        &self,
        name: &SessionName,
        f: impl FnOnce(&mut MemorySession) -> T,
    ) -> Result<T> {
        let mut sessions = self.inner.sessions.lock();
        let session = sessions
            .get_mut(name)
            .ok_or_else(|| BridgeError::backend(format!("can't find session: {name}")))?;
        Ok(f(session))
    }

    fn react(&self, name: &SessionName, line: &str) {
        let Some(responder) = self.inner.responder.as_ref() else {
            return;
        };
        match responder(name, line) {
            Reaction::Nothing => {}
            Reaction::Print(text) => {
                self.print(name, &text);
            }
            Reaction::Exit => {
                self.terminate(name);
            }
        }
    }
}

impl TerminalBackend for MemoryBackend {
    async fn has_session(&self, name: &SessionName) -> bool {
        self.inner.sessions.lock().contains_key(name)
    }

    async fn new_session(&self, name: &SessionName, work_dir: &Path) -> Result<()> {
        let mut sessions = self.inner.sessions.lock();
        if sessions.contains_key(name) {
            return Err(BridgeError::backend(format!("duplicate session: {name}")));
        }
        sessions.insert(
            name.clone(),
            MemorySession {
                work_dir: work_dir.to_path_buf(),
                ..MemorySession::default()
            },
        );
        Ok(())
    }

    async fn kill_session(&self, name: &SessionName) -> Result<()> {
        if self.terminate(name) {
            Ok(())
        } else {
            Err(BridgeError::backend(format!("can't find session: {name}")))
        }
    }

    async fn send_literal(&self, name: &SessionName, text: &str) -> Result<()> {
        self.check_injection(name)?;
        self.with_session(name, |s| s.input.push_str(text))
    }

    async fn send_key(&self, name: &SessionName, key: Key) -> Result<()> {
        let line = self.with_session(name, |s| {
            s.keys.push(key);
            match key {
                Key::Enter => {
                    let line = std::mem::take(&mut s.input);
                    s.print(&line);
                    s.submitted.push(line.clone());
                    Some(line)
                }
                Key::CtrlC => {
                    s.input.clear();
                    None
                }
                Key::Escape => None,
            }
        })?;

        // Responder runs without the lock so it may call back into the backend
        if let Some(line) = line {
            self.react(name, &line);
        }
        Ok(())
    }

    async fn paste_bracketed(&self, name: &SessionName, text: &str) -> Result<()> {
        self.check_injection(name)?;
        self.with_session(name, |s| s.input.push_str(text))
    }

    async fn capture(&self, name: &SessionName, lines: usize) -> Result<String> {
        self.with_session(name, |s| {
            let start = s.screen.len().saturating_sub(lines);
            s.screen[start..].join("\n")
        })
    }
}
