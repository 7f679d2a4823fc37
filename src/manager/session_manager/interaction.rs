//! Text injection, control keys, and screen capture

use tokio::time::sleep;

use crate::error::{BridgeError, Result};
use crate::terminal::config::{
    CHUNK_DELAY, CHUNK_SIZE, CHUNK_SUBMIT_DELAY, LINE_SUBMIT_DELAY, chunk_text,
    paste_settle_delay,
};
use crate::terminal::{InjectionStrategy, Key, TerminalBackend};
use crate::types::SessionName;

use super::core::SessionManager;

impl<B: TerminalBackend> SessionManager<B> {
    /// Type `text` into a session and submit it
    ///
    /// Updates the session's last activity on success.
    ///
    /// # Errors
    /// Returns `SessionNotFound` if the session is gone, `InjectionFailed` if
    /// the backend rejects the delivery. Failed deliveries are not retried.
    pub async fn inject(
        &self,
        name: &SessionName,
        text: &str,
        strategy: InjectionStrategy,
    ) -> Result<()> {
        if !self.exists(name).await {
            return Err(BridgeError::session_not_found(name.as_str()));
        }

        self.deliver(name, text, strategy)
            .await
            .map_err(|e| BridgeError::injection_failed(name.as_str(), e.to_string()))?;

        self.touch(name);
        log::debug!(
            "[{name}] Injected {} chars via {strategy:?}",
            text.chars().count()
        );
        Ok(())
    }

    /// Send one control key
    ///
    /// # Errors
    /// Returns `SessionNotFound` if the session is gone, `InjectionFailed` if
    /// the backend rejects the key
    pub async fn send_key(&self, name: &SessionName, key: Key) -> Result<()> {
        if !self.exists(name).await {
            return Err(BridgeError::session_not_found(name.as_str()));
        }
        self.backend
            .send_key(name, key)
            .await
            .map_err(|e| BridgeError::injection_failed(name.as_str(), e.to_string()))
    }

    /// Capture the default window of rendered output
    ///
    /// # Errors
    /// Returns `SessionNotFound` if the session is gone
    pub async fn capture_screen(&self, name: &SessionName) -> Result<String> {
        self.capture_lines(name, self.capture_lines).await
    }

    /// Capture the last `lines` lines of rendered output
    ///
    /// # Errors
    /// Returns `SessionNotFound` if the session is gone
    pub async fn capture_lines(&self, name: &SessionName, lines: usize) -> Result<String> {
        if !self.exists(name).await {
            return Err(BridgeError::session_not_found(name.as_str()));
        }
        self.backend.capture(name, lines).await
    }

    pub(crate) async fn deliver(
        &self,
        name: &SessionName,
        text: &str,
        strategy: InjectionStrategy,
    ) -> Result<()> {
        match strategy {
            InjectionStrategy::Line => {
                self.backend.send_literal(name, text).await?;
                sleep(LINE_SUBMIT_DELAY).await;
            }
            InjectionStrategy::BulkPaste => {
                self.backend.paste_bracketed(name, text).await?;
                sleep(paste_settle_delay(text.chars().count())).await;
            }
            InjectionStrategy::ChunkedTyping => {
                for (idx, chunk) in chunk_text(text, CHUNK_SIZE).into_iter().enumerate() {
                    if idx > 0 {
                        sleep(CHUNK_DELAY).await;
                    }
                    self.backend.send_literal(name, chunk).await?;
                }
                sleep(CHUNK_SUBMIT_DELAY).await;
            }
        }
        self.backend.send_key(name, Key::Enter).await
    }
}
