//! Background inactivity reaper
//!
//! Destroys sessions whose last activity is older than a threshold. Failures
//! are logged and the sweep moves on.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use crate::terminal::TerminalBackend;
use crate::types::SessionName;

use super::session_manager::SessionManager;

impl<B: TerminalBackend> SessionManager<B> {
    /// Destroy sessions idle for longer than `threshold`
    pub async fn reap_idle(&self, threshold: Duration) -> Vec<SessionName> {
        self.reap_idle_at(Utc::now(), threshold).await
    }

    /// Destroy sessions idle for longer than `threshold` as of `now`
    ///
    /// Sessions with an outstanding request are skipped whatever their idle
    /// time. Returns the names that were destroyed.
    pub async fn reap_idle_at(&self, now: DateTime<Utc>, threshold: Duration) -> Vec<SessionName> {
        let busy: Vec<SessionName> = self.in_flight.lock().keys().cloned().collect();
        let idle: Vec<SessionName> = {
            let sessions = self.sessions.lock();
            sessions
                .values()
                .filter(|s| s.idle_for(now) > threshold && !busy.contains(&s.name))
                .map(|s| s.name.clone())
                .collect()
        };

        let mut reaped = Vec::with_capacity(idle.len());
        for name in idle {
            log::info!("[{name}] Idle for more than {}s, destroying", threshold.as_secs());
            match self.destroy(&name).await {
                Ok(()) => reaped.push(name),
                Err(e) => log::warn!("[{name}] Reaper failed to destroy session: {e}"),
            }
        }
        reaped
    }
}

/// Spawn the periodic reaper task
///
/// The task runs until its handle is aborted.
pub fn spawn_reaper<B>(
    manager: Arc<SessionManager<B>>,
    interval: Duration,
    threshold: Duration,
) -> JoinHandle<()>
where
    B: TerminalBackend + 'static,
{
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;

            let reaped = manager.reap_idle(threshold).await;
            if !reaped.is_empty() {
                log::debug!("Reaper destroyed {} idle session(s)", reaped.len());
            }
        }
    })
}
