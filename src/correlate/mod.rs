//! Request correlation
//!
//! A prompt is wrapped with a fresh `[RQ-<token>]` marker and an instruction
//! to end the answer with `[ANS-<token>]`. The answer is then found by
//! polling a [`ResponseSource`] for a record carrying that exact marker, so
//! requests racing in the same log file each pick up only their own record.

pub mod logs;
pub mod prompt;
pub mod source;

use std::time::{Duration, SystemTime};

use crate::error::{BridgeError, Result};
use crate::manager::SessionManager;
use crate::terminal::TerminalBackend;
use crate::types::{AgentConfig, RequestToken, SessionName};
use crate::wait::poll_until;

pub use logs::LogDirSource;
pub use prompt::{PromptConstraints, build_prompt, strip_markers};
pub use source::{AgentSource, ResponseSource, ScreenSource, extract_from_screen};

/// Response poll cadence
pub const RESPONSE_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Pause after each pre-submit key
pub const PRE_SUBMIT_KEY_DELAY: Duration = Duration::from_millis(100);

/// A prompt that has been typed into a session
#[derive(Debug, Clone)]
pub struct Submission {
    /// Token correlating the prompt with its answer
    pub token: RequestToken,
    /// Wall-clock time just before delivery started
    pub since: SystemTime,
}

/// Waits for correlated answers on one session manager
pub struct Correlator<'a, B> {
    manager: &'a SessionManager<B>,
    interval: Duration,
}

impl<'a, B: TerminalBackend> Correlator<'a, B> {
    /// Correlator polling every [`RESPONSE_POLL_INTERVAL`]
    pub fn new(manager: &'a SessionManager<B>) -> Self {
        Self {
            manager,
            interval: RESPONSE_POLL_INTERVAL,
        }
    }

    /// Override the poll interval
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Wrap `raw` for `config` and type it into `session`
    ///
    /// # Errors
    /// Returns `SessionNotFound` or `InjectionFailed` from the session manager
    pub async fn submit(
        &self,
        session: &SessionName,
        config: &AgentConfig,
        raw: &str,
        allow_file_edits: bool,
    ) -> Result<Submission> {
        let token = RequestToken::generate();
        let since = SystemTime::now();

        for key in &config.pre_submit_keys {
            self.manager.send_key(session, *key).await?;
            tokio::time::sleep(PRE_SUBMIT_KEY_DELAY).await;
        }

        let constraints = PromptConstraints::for_agent(config, allow_file_edits);
        let prompt = build_prompt(raw, &token, &constraints);
        self.manager.inject(session, &prompt, config.injection).await?;

        log::info!("[{session}] Prompt {token} submitted");
        Ok(Submission { token, since })
    }

    /// Block until `source` yields the answer to `token`
    ///
    /// Each tick first checks that `session` is still alive, then scans. The
    /// session counts as busy for the reaper until this returns.
    ///
    /// # Errors
    /// Returns `SessionTerminatedByUser` if the session disappears,
    /// `ResponseTimeout` if no answer shows up within `timeout`
    pub async fn await_response<S: ResponseSource>(
        &self,
        session: &SessionName,
        token: &RequestToken,
        since: SystemTime,
        source: &S,
        timeout: Duration,
    ) -> Result<String> {
        let manager = self.manager;
        let _in_flight = manager.begin_request(session);

        let found = poll_until(self.interval, timeout, || async move {
            if !manager.exists(session).await {
                log::warn!("[{session}] Session vanished while awaiting {token}");
                return Err(BridgeError::terminated_by_user(session.as_str(), token.as_str()));
            }
            match source.scan_for_token(token, since).await {
                Err(BridgeError::SessionNotFound(_)) => Err(BridgeError::terminated_by_user(
                    session.as_str(),
                    token.as_str(),
                )),
                other => other,
            }
        })
        .await?;

        match found {
            Some(answer) => {
                log::debug!("[{session}] Answer for {token}: {} chars", answer.chars().count());
                Ok(answer)
            }
            None => {
                log::warn!("[{session}] No answer for {token} after {}ms", timeout.as_millis());
                Err(BridgeError::response_timeout(token.as_str(), timeout))
            }
        }
    }
}
