//! Parallel fan-out
//!
//! Spreads a batch of independent prompts over dedicated sessions of several
//! agent kinds, runs them concurrently, and tears every session down again
//! whatever the outcome.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::config::HubSettings;
use crate::correlate::{AgentSource, Correlator};
use crate::detect::ReadinessProbe;
use crate::error::{BridgeError, Result};
use crate::manager::{SessionLease, SessionManager, SessionNaming};
use crate::terminal::TerminalBackend;
use crate::types::{AgentConfig, AgentId, SessionName};

/// Split `total` items over `kinds` contiguous groups, earlier groups taking the remainder
#[must_use]
pub fn partition(total: usize, kinds: usize) -> Vec<usize> {
    if kinds == 0 {
        return Vec::new();
    }
    let base = total / kinds;
    let remainder = total % kinds;
    (0..kinds).map(|i| base + usize::from(i < remainder)).collect()
}

// ============================================================================
// Report
// ============================================================================

/// Outcome of one fan-out prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanOutEntry {
    /// Prompt as given
    pub query: String,
    /// Agent kind that served it
    pub agent: AgentId,
    /// Dedicated session used
    pub session_name: SessionName,
    /// Extracted answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall time of this prompt, session setup included
    pub duration_ms: u64,
}

impl FanOutEntry {
    /// TRUE if an answer was extracted
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// All outcomes of one batch, in submission order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FanOutReport {
    /// One entry per accepted prompt
    pub entries: Vec<FanOutEntry>,
    /// Prompts dropped because the batch was over the cap
    pub dropped: usize,
}

impl FanOutReport {
    /// Number of successful entries
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.is_success()).count()
    }

    /// Number of failed entries
    #[must_use]
    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }

    /// Summary line followed by one section per entry
    #[must_use]
    pub fn render(&self) -> String {
        let mut kinds: Vec<(&AgentId, usize)> = Vec::new();
        for entry in &self.entries {
            match kinds.iter_mut().find(|(id, _)| *id == &entry.agent) {
                Some((_, count)) => *count += 1,
                None => kinds.push((&entry.agent, 1)),
            }
        }
        let breakdown = kinds
            .iter()
            .map(|(id, count)| format!("{count} {id}"))
            .collect::<Vec<_>>()
            .join(" + ");

        let summary = format!(
            "{} queries ({breakdown}) | {} succeeded | {} failed",
            self.entries.len(),
            self.succeeded(),
            self.failed()
        );

        let sections = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let body = match (&e.response, &e.error) {
                    (_, Some(error)) => format!("Error: {error}"),
                    (Some(response), None) => response.clone(),
                    (None, None) => String::new(),
                };
                format!("## Query {} [{}]: {}\n\n{body}", i + 1, e.agent, e.query)
            })
            .collect::<Vec<_>>()
            .join("\n\n---\n\n");

        format!("{summary}\n\n---\n\n{sections}")
    }
}

// ============================================================================
// Coordinator
// ============================================================================

/// Runs prompt batches over dedicated sessions
pub struct FanOutCoordinator<B: TerminalBackend + 'static> {
    manager: Arc<SessionManager<B>>,
    naming: SessionNaming,
    kinds: Vec<AgentConfig>,
    cap: usize,
    ready_timeout: Duration,
    response_timeout: Duration,
    poll_interval: Duration,
    log_home: Option<PathBuf>,
}

impl<B: TerminalBackend + 'static> FanOutCoordinator<B> {
    /// Coordinator over `kinds`, in partition order
    ///
    /// # Errors
    /// Returns `InvalidConfig` if `kinds` is empty or the cap is zero
    pub fn new(
        manager: Arc<SessionManager<B>>,
        naming: SessionNaming,
        kinds: Vec<AgentConfig>,
        settings: &HubSettings,
    ) -> Result<Self> {
        if kinds.is_empty() {
            return Err(BridgeError::invalid_config("fan-out needs at least one agent kind"));
        }
        if settings.fan_out_cap == 0 {
            return Err(BridgeError::invalid_config("fan-out cap must be positive"));
        }
        Ok(Self {
            manager,
            naming,
            kinds,
            cap: settings.fan_out_cap,
            ready_timeout: settings.fan_out_ready_timeout(),
            response_timeout: settings.fan_out_response_timeout(),
            poll_interval: settings.response_poll(),
            log_home: settings.log_home.clone(),
        })
    }

    /// Run `queries` concurrently, one dedicated session each
    pub async fn run(&self, work_dir: &Path, mut queries: Vec<String>) -> FanOutReport {
        let mut dropped = 0;
        if queries.len() > self.cap {
            dropped = queries.len() - self.cap;
            log::warn!("Fan-out batch of {} exceeds cap {}, dropping {dropped}", queries.len(), self.cap);
            queries.truncate(self.cap);
        }

        let counts = partition(queries.len(), self.kinds.len());
        let mut queries = queries.into_iter();
        let mut slots = Vec::with_capacity(queries.len());
        for (kind, count) in self.kinds.iter().zip(counts) {
            for index in 0..count {
                if let Some(query) = queries.next() {
                    slots.push(self.run_slot(work_dir, query, kind, index));
                }
            }
        }

        let entries = join_all(slots).await;
        let report = FanOutReport { entries, dropped };
        log::info!(
            "Fan-out finished: {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );
        report
    }

    async fn run_slot(
        &self,
        work_dir: &Path,
        query: String,
        kind: &AgentConfig,
        index: usize,
    ) -> FanOutEntry {
        let started = Instant::now();
        let name = self.naming.slot_name(&kind.name, index);
        let lease = SessionLease::new(Arc::clone(&self.manager), name.clone());

        let outcome = self.ask_in_slot(work_dir, &query, kind, &name).await;

        if let Err(e) = lease.release().await {
            log::warn!("[{name}] Failed to destroy fan-out session: {e}");
        }

        let (response, error) = match outcome {
            Ok(answer) => (Some(answer), None),
            Err(e) => {
                log::warn!("[{name}] Fan-out prompt failed: {e}");
                (None, Some(e.to_string()))
            }
        };

        FanOutEntry {
            query,
            agent: kind.name.clone(),
            session_name: name,
            response,
            error,
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }

    async fn ask_in_slot(
        &self,
        work_dir: &Path,
        query: &str,
        kind: &AgentConfig,
        name: &SessionName,
    ) -> Result<String> {
        self.manager.create(name, work_dir, &kind.command).await?;
        ReadinessProbe::for_agent(kind)
            .wait(&*self.manager, name, self.ready_timeout)
            .await?;

        let correlator = Correlator::new(&*self.manager).with_interval(self.poll_interval);
        let submission = correlator.submit(name, kind, query, false).await?;
        let source = AgentSource::for_agent(
            kind,
            &*self.manager,
            name,
            work_dir,
            self.log_home.as_deref(),
        )?;
        correlator
            .await_response(
                name,
                &submission.token,
                submission.since,
                &source,
                self.response_timeout,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_gives_remainder_to_earlier_kinds() {
        assert_eq!(partition(3, 2), vec![2, 1]);
        assert_eq!(partition(4, 2), vec![2, 2]);
        assert_eq!(partition(1, 2), vec![1, 0]);
        assert_eq!(partition(5, 3), vec![2, 2, 1]);
        assert!(partition(4, 0).is_empty());
    }
}
