//! Session creation and destruction

use std::path::Path;

use crate::error::{BridgeError, Result};
use crate::terminal::{InjectionStrategy, TerminalBackend};
use crate::types::SessionName;

use super::super::session::Session;
use super::core::SessionManager;

impl<B: TerminalBackend> SessionManager<B> {
    /// Open a fresh session and submit the launch command as its first line
    ///
    /// A live session already using `name` is destroyed first, never reused.
    ///
    /// # Errors
    /// Returns `Backend` if the session cannot be opened, `InjectionFailed` if
    /// the launch line cannot be typed (the half-made session is killed)
    pub async fn create(
        &self,
        name: &SessionName,
        work_dir: &Path,
        command: &[String],
    ) -> Result<Session> {
        if self.backend.has_session(name).await {
            log::info!("[{name}] Replacing existing session");
            self.backend.kill_session(name).await?;
        }
        self.sessions.lock().remove(name);

        self.backend.new_session(name, work_dir).await?;

        let launch = command.join(" ");
        if let Err(e) = self.deliver(name, &launch, InjectionStrategy::Line).await {
            log::error!("[{name}] Failed to submit launch command: {e}");
            if let Err(kill_err) = self.backend.kill_session(name).await {
                log::warn!("[{name}] Cleanup after failed launch also failed: {kill_err}");
            }
            return Err(BridgeError::injection_failed(name.as_str(), e.to_string()));
        }

        let session = Session::new(name.clone(), work_dir.to_path_buf());
        self.sessions.lock().insert(name.clone(), session.clone());
        log::info!("[{name}] Session created in {}: {launch}", work_dir.display());
        Ok(session)
    }

    /// Destroy a session; a no-op if it is already gone
    ///
    /// The cache entry is always removed.
    ///
    /// # Errors
    /// Returns `Backend` if a live session cannot be killed
    pub async fn destroy(&self, name: &SessionName) -> Result<()> {
        self.sessions.lock().remove(name);
        if self.backend.has_session(name).await {
            self.backend.kill_session(name).await?;
            log::info!("[{name}] Session destroyed");
        } else {
            log::debug!("[{name}] Destroy requested for absent session");
        }
        Ok(())
    }

    /// Destroy every tracked session, returning how many were torn down
    pub async fn destroy_all(&self) -> usize {
        let names: Vec<SessionName> = self.sessions.lock().keys().cloned().collect();

        let mut destroyed = 0;
        for name in names {
            match self.destroy(&name).await {
                Ok(()) => destroyed += 1,
                Err(e) => log::warn!("[{name}] Failed to destroy session: {e}"),
            }
        }
        destroyed
    }
}
