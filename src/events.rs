//! Per-agent event queue
//!
//! Outcomes are appended here as they are observed and drained by whoever
//! polls. `wait_for` checks and drains under a single lock so an event pushed
//! between the check and the drain cannot be lost.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;

use crate::types::{AgentId, EventKind, PendingEvent};
use crate::wait::poll_until;

/// Default `wait_for` budget
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default `wait_for` poll cadence
pub const DEFAULT_WAIT_INTERVAL: Duration = Duration::from_millis(500);

/// In-memory event buffers keyed by agent
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Mutex<HashMap<AgentId, Vec<PendingEvent>>>,
}

impl EventQueue {
    /// Empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event for `agent`
    pub fn push(&self, agent: &AgentId, event: PendingEvent) {
        log::debug!("Event {} queued for {agent}", event.kind.as_str());
        self.events.lock().entry(agent.clone()).or_default().push(event);
    }

    /// Current events for `agent`; unless `peek`, the list is cleared
    pub fn poll(&self, agent: &AgentId, peek: bool) -> Vec<PendingEvent> {
        let mut events = self.events.lock();
        if peek {
            events.get(agent).cloned().unwrap_or_default()
        } else {
            events.remove(agent).unwrap_or_default()
        }
    }

    /// Number of queued events for `agent`
    pub fn len(&self, agent: &AgentId) -> usize {
        self.events.lock().get(agent).map_or(0, Vec::len)
    }

    /// TRUE if nothing is queued for `agent`
    pub fn is_empty(&self, agent: &AgentId) -> bool {
        self.len(agent) == 0
    }

    /// Drop everything queued for `agent`
    pub fn clear(&self, agent: &AgentId) {
        self.events.lock().remove(agent);
    }

    /// Drain `agent`'s batch if it holds an event of `kind`, returning that event
    ///
    /// The rest of the batch is discarded with it. Nothing changes otherwise.
    pub fn take_first(&self, agent: &AgentId, kind: EventKind) -> Option<PendingEvent> {
        let mut events = self.events.lock();
        let position = events.get(agent)?.iter().position(|e| e.kind == kind)?;
        let mut batch = events.remove(agent)?;
        Some(batch.swap_remove(position))
    }

    /// Wait until an event of `kind` is queued for `agent`
    ///
    /// Returns `None` on timeout and leaves the queue untouched.
    pub async fn wait_for(
        &self,
        agent: &AgentId,
        kind: EventKind,
        timeout: Duration,
        interval: Duration,
    ) -> Option<PendingEvent> {
        poll_until(interval, timeout, || async move { Ok(self.take_first(agent, kind)) })
            .await
            .ok()
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_first_consumes_whole_batch() {
        let queue = EventQueue::new();
        let agent = AgentId::new("codex_medium");
        queue.push(&agent, PendingEvent::new(EventKind::ToolComplete, None));
        queue.push(&agent, PendingEvent::message_complete("done"));

        let event = queue.take_first(&agent, EventKind::MessageComplete);
        assert_eq!(event.map(|e| e.kind), Some(EventKind::MessageComplete));
        assert!(queue.is_empty(&agent));
    }

    #[test]
    fn take_first_without_match_keeps_batch() {
        let queue = EventQueue::new();
        let agent = AgentId::new("gemini_pro");
        queue.push(&agent, PendingEvent::error("boom"));

        assert!(queue.take_first(&agent, EventKind::SessionIdle).is_none());
        assert_eq!(queue.len(&agent), 1);
    }
}
