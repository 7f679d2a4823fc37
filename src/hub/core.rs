//! Core hub structure and lifecycle management

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::config::HubSettings;
use crate::events::EventQueue;
use crate::manager::{SessionManager, SessionNaming, spawn_reaper};
use crate::registry::AgentRegistry;
use crate::terminal::TerminalBackend;
use crate::types::{AgentId, SessionName};

// ============================================================================
// AGENT HUB CORE
// ============================================================================

/// Drives registered agents as callable request/response functions
///
/// The `AgentHub` coordinates:
/// - One long-lived session per agent, created on first use
/// - Correlated prompts and their outcomes
/// - Per-agent event queues
/// - Parallel fan-out over dedicated sessions
/// - The inactivity reaper
pub struct AgentHub<B: TerminalBackend + 'static> {
    pub(super) manager: Arc<SessionManager<B>>,
    pub(super) registry: AgentRegistry,
    pub(super) naming: SessionNaming,
    pub(super) events: EventQueue,
    pub(super) settings: HubSettings,
    pub(super) submit_gates: Mutex<HashMap<SessionName, Arc<tokio::sync::Mutex<()>>>>,
    reaper: Mutex<Option<JoinHandle<()>>>,
}

impl<B: TerminalBackend + 'static> AgentHub<B> {
    /// Create a hub with a random instance tag
    pub fn new(backend: B, registry: AgentRegistry, settings: HubSettings) -> Self {
        let manager = SessionManager::new(backend).with_capture_lines(settings.capture_lines);
        Self {
            manager: Arc::new(manager),
            registry,
            naming: SessionNaming::random(),
            events: EventQueue::new(),
            settings,
            submit_gates: Mutex::new(HashMap::new()),
            reaper: Mutex::new(None),
        }
    }

    /// Use a fixed naming scheme
    #[must_use]
    pub fn with_naming(mut self, naming: SessionNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Session manager shared with fan-out slots
    pub fn manager(&self) -> &Arc<SessionManager<B>> {
        &self.manager
    }

    /// Registered agents
    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Session naming scheme
    pub fn naming(&self) -> &SessionNaming {
        &self.naming
    }

    /// Per-agent event queue
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Hub settings
    pub fn settings(&self) -> &HubSettings {
        &self.settings
    }

    /// Session name `agent` is addressed by
    pub fn session_name(&self, agent: &AgentId) -> SessionName {
        self.naming.session_name(agent)
    }

    pub(super) fn submit_gate(&self, name: &SessionName) -> Arc<tokio::sync::Mutex<()>> {
        Arc::clone(self.submit_gates.lock().entry(name.clone()).or_default())
    }

    /// Start the periodic inactivity reaper, replacing a running one
    pub fn start_reaper(&self) {
        let handle = spawn_reaper(
            Arc::clone(&self.manager),
            self.settings.reaper_interval(),
            self.settings.idle_timeout(),
        );
        if let Some(previous) = self.reaper.lock().replace(handle) {
            previous.abort();
        }
        log::debug!(
            "Reaper started: every {}s, idle threshold {}s",
            self.settings.reaper_interval().as_secs(),
            self.settings.idle_timeout().as_secs()
        );
    }

    /// Stop the reaper and destroy every tracked session
    ///
    /// Returns the number of sessions destroyed.
    pub async fn shutdown(&self) -> usize {
        log::info!("Shutting down agent hub...");

        if let Some(handle) = self.reaper.lock().take() {
            handle.abort();
        }
        let destroyed = self.manager.destroy_all().await;
        self.submit_gates.lock().clear();

        log::info!("Agent hub shutdown complete ({destroyed} session(s) destroyed)");
        destroyed
    }
}

impl<B: TerminalBackend + 'static> Drop for AgentHub<B> {
    fn drop(&mut self) {
        if let Some(handle) = self.reaper.lock().take() {
            handle.abort();
        }
    }
}
