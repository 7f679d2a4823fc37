//! Status snapshots, events, and fan-out

use std::path::Path;
use std::time::Duration;

use crate::error::Result;
use crate::fanout::{FanOutCoordinator, FanOutReport};
use crate::terminal::TerminalBackend;
use crate::types::{AgentConfig, AgentId, AgentStatus, EventKind, PendingEvent};

use super::core::AgentHub;

impl<B: TerminalBackend + 'static> AgentHub<B> {
    /// Snapshot of one agent
    pub async fn status(&self, agent: &AgentId) -> AgentStatus {
        let session_name = self.session_name(agent);
        let connected = self.manager.exists(&session_name).await;
        let last_activity = self.manager.get(&session_name).map(|s| s.last_activity);

        AgentStatus {
            agent: agent.clone(),
            connected,
            session_name,
            last_activity,
            pending_events: self.events.len(agent),
        }
    }

    /// Snapshots of every registered agent
    pub async fn statuses(&self) -> Vec<AgentStatus> {
        let mut statuses = Vec::new();
        for agent in self.registry.ids() {
            statuses.push(self.status(&agent).await);
        }
        statuses
    }

    /// Queued events of `agent`; unless `peek`, they are drained
    pub fn poll_events(&self, agent: &AgentId, peek: bool) -> Vec<PendingEvent> {
        self.events.poll(agent, peek)
    }

    /// Wait for an event of `kind` on `agent`'s queue; `None` on timeout
    pub async fn wait_for_event(
        &self,
        agent: &AgentId,
        kind: EventKind,
        timeout: Duration,
        interval: Duration,
    ) -> Option<PendingEvent> {
        self.events.wait_for(agent, kind, timeout, interval).await
    }

    /// Run a fan-out batch over the given agent kinds
    ///
    /// # Errors
    /// Returns `UnknownAgent` for an unregistered kind, `InvalidConfig` if no
    /// kind is given. Per-prompt failures land in the report instead.
    pub async fn fan_out(
        &self,
        work_dir: &Path,
        queries: Vec<String>,
        kinds: &[AgentId],
    ) -> Result<FanOutReport> {
        let configs = kinds
            .iter()
            .map(|kind| self.registry.get(kind).cloned())
            .collect::<Result<Vec<AgentConfig>>>()?;

        let coordinator = FanOutCoordinator::new(
            std::sync::Arc::clone(&self.manager),
            self.naming.clone(),
            configs,
            &self.settings,
        )?;
        Ok(coordinator.run(work_dir, queries).await)
    }
}
