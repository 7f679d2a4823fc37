//! Readiness detection
//!
//! Polls the rendered screen for literal substrings to decide when a freshly
//! launched agent has finished starting up.

use std::time::Duration;

use crate::error::{BridgeError, Result};
use crate::manager::SessionManager;
use crate::terminal::{Key, TerminalBackend};
use crate::types::{AgentConfig, SessionName};
use crate::wait::poll_until;

/// Screen poll cadence while waiting for ready
pub const READY_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Extra delay after a match so the program can finish painting
pub const READY_SETTLE: Duration = Duration::from_millis(500);

/// Byte offset and pattern of the lowest occurrence of any pattern on screen
#[must_use]
pub fn last_match<'a>(screen: &str, patterns: &'a [String]) -> Option<(usize, &'a str)> {
    patterns
        .iter()
        .filter(|p| !p.is_empty())
        .filter_map(|p| screen.rfind(p.as_str()).map(|idx| (idx, p.as_str())))
        .max_by_key(|(idx, _)| *idx)
}

/// Ready-wait parameters for one agent kind
#[derive(Debug, Clone)]
pub struct ReadinessProbe {
    patterns: Vec<String>,
    dismiss_prompts: Vec<String>,
    interval: Duration,
    settle: Duration,
}

impl ReadinessProbe {
    /// Probe matching any of `patterns`
    pub fn new(patterns: Vec<impl Into<String>>) -> Self {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            dismiss_prompts: Vec::new(),
            interval: READY_POLL_INTERVAL,
            settle: READY_SETTLE,
        }
    }

    /// Probe built from an agent descriptor
    #[must_use]
    pub fn for_agent(config: &AgentConfig) -> Self {
        Self::new(config.ready_patterns.clone()).with_dismiss_prompts(config.dismiss_prompts.clone())
    }

    /// Dialog texts answered with Enter while waiting
    #[must_use]
    pub fn with_dismiss_prompts(mut self, prompts: Vec<impl Into<String>>) -> Self {
        self.dismiss_prompts = prompts.into_iter().map(Into::into).collect();
        self
    }

    /// Override the poll interval
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Override the post-match settle delay
    #[must_use]
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Wait until any pattern shows up on screen, returning the pattern
    ///
    /// # Errors
    /// Returns `ReadyTimeout` if nothing matches within `timeout`, or
    /// `SessionNotFound` if the session disappears while waiting
    pub async fn wait<B: TerminalBackend>(
        &self,
        manager: &SessionManager<B>,
        name: &SessionName,
        timeout: Duration,
    ) -> Result<String> {
        let patterns = &self.patterns;
        let dismiss = &self.dismiss_prompts;

        let matched = poll_until(self.interval, timeout, || async move {
            let screen = manager.capture_screen(name).await?;
            let ready = last_match(&screen, patterns);

            // A dialog is still pending if nothing ready-looking was painted below it
            if let Some((dialog_at, prompt)) = last_match(&screen, dismiss)
                && ready.is_none_or(|(ready_at, _)| dialog_at > ready_at)
            {
                log::info!("[{name}] Dismissing interactive prompt: {prompt}");
                manager.send_key(name, Key::Enter).await?;
                return Ok(None);
            }

            Ok(ready.map(|(_, pattern)| pattern.to_string()))
        })
        .await?;

        match matched {
            Some(pattern) => {
                log::debug!("[{name}] Ready ({pattern})");
                tokio::time::sleep(self.settle).await;
                Ok(pattern)
            }
            None => {
                log::warn!("[{name}] Not ready after {}ms", timeout.as_millis());
                Err(BridgeError::ready_timeout(name.as_str(), timeout))
            }
        }
    }
}

/// Wait until any of `patterns` appears on screen
///
/// # Errors
/// Returns `ReadyTimeout` if nothing matches within `timeout`
pub async fn await_pattern<B: TerminalBackend>(
    manager: &SessionManager<B>,
    name: &SessionName,
    patterns: &[String],
    timeout: Duration,
) -> Result<()> {
    ReadinessProbe::new(patterns.to_vec())
        .wait(manager, name, timeout)
        .await
        .map(|_| ())
}
