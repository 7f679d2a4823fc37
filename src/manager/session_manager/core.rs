//! Core session manager structure and registry queries

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::Mutex;

use crate::terminal::TerminalBackend;
use crate::terminal::config::DEFAULT_CAPTURE_LINES;
use crate::types::SessionName;

use super::super::session::Session;

// ============================================================================
// SESSION MANAGER CORE
// ============================================================================

/// Registry of terminal sessions on one backend
///
/// The `SessionManager` coordinates terminal sessions, handling:
/// - Session lifecycle (create, destroy, reap)
/// - Text delivery with three injection strategies
/// - Screen capture
/// - Last-activity tracking
///
/// The in-memory map is a cache. `exists` always asks the backend and drops
/// cache entries for sessions the backend no longer knows.
pub struct SessionManager<B> {
    pub(crate) backend: B,
    pub(crate) sessions: Mutex<HashMap<SessionName, Session>>,
    pub(crate) in_flight: Mutex<HashMap<SessionName, usize>>,
    pub(crate) capture_lines: usize,
}

/// Marks a session busy with an outstanding request until dropped
#[must_use = "the session is only busy while the guard is alive"]
pub struct InFlightGuard<'a> {
    counts: &'a Mutex<HashMap<SessionName, usize>>,
    name: SessionName,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut counts = self.counts.lock();
        if let Some(count) = counts.get_mut(&self.name) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                counts.remove(&self.name);
            }
        }
    }
}

impl<B: TerminalBackend> SessionManager<B> {
    /// Create a manager over `backend`
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            sessions: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            capture_lines: DEFAULT_CAPTURE_LINES,
        }
    }

    /// Set the default capture window
    #[must_use]
    pub fn with_capture_lines(mut self, lines: usize) -> Self {
        self.capture_lines = lines.max(1);
        self
    }

    /// The backend this manager drives
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Authoritative liveness check
    pub async fn exists(&self, name: &SessionName) -> bool {
        let alive = self.backend.has_session(name).await;
        if !alive && self.sessions.lock().remove(name).is_some() {
            log::debug!("[{name}] Session gone from backend, dropping cache entry");
        }
        alive
    }

    /// Mark a session active now; FALSE if it is not tracked
    pub fn touch(&self, name: &SessionName) -> bool {
        match self.sessions.lock().get_mut(name) {
            Some(session) => {
                session.last_activity = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Mark `name` busy until the guard drops; busy sessions are never reaped
    pub fn begin_request(&self, name: &SessionName) -> InFlightGuard<'_> {
        *self.in_flight.lock().entry(name.clone()).or_default() += 1;
        InFlightGuard {
            counts: &self.in_flight,
            name: name.clone(),
        }
    }

    /// Number of outstanding requests on `name`
    pub fn in_flight(&self, name: &SessionName) -> usize {
        self.in_flight.lock().get(name).copied().unwrap_or(0)
    }

    /// Snapshot of one tracked session
    pub fn get(&self, name: &SessionName) -> Option<Session> {
        self.sessions.lock().get(name).cloned()
    }

    /// Snapshot of all tracked sessions, sorted by name
    pub fn sessions(&self) -> Vec<Session> {
        let mut sessions: Vec<Session> = self.sessions.lock().values().cloned().collect();
        sessions.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
        sessions
    }

    /// Number of tracked sessions
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    /// TRUE if no session is tracked
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}
