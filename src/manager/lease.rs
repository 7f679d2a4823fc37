//! Guard for dedicated sessions

use std::sync::Arc;

use crate::error::Result;
use crate::terminal::TerminalBackend;
use crate::types::SessionName;

use super::session_manager::SessionManager;

/// Owns a dedicated session until it is released
///
/// Call [`SessionLease::release`] on every normal exit path. If the lease is
/// dropped unreleased (cancellation, panic), a best-effort destroy is spawned
/// on the current runtime.
pub struct SessionLease<B: TerminalBackend + 'static> {
    manager: Arc<SessionManager<B>>,
    name: SessionName,
    released: bool,
}

impl<B: TerminalBackend + 'static> SessionLease<B> {
    /// Take ownership of `name`
    pub fn new(manager: Arc<SessionManager<B>>, name: SessionName) -> Self {
        Self {
            manager,
            name,
            released: false,
        }
    }

    /// Leased session name
    #[must_use]
    pub fn name(&self) -> &SessionName {
        &self.name
    }

    /// Destroy the session now
    ///
    /// # Errors
    /// Returns `Backend` if a live session cannot be killed
    pub async fn release(mut self) -> Result<()> {
        self.released = true;
        self.manager.destroy(&self.name).await
    }
}

impl<B: TerminalBackend + 'static> Drop for SessionLease<B> {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let name = self.name.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let manager = Arc::clone(&self.manager);
                handle.spawn(async move {
                    if let Err(e) = manager.destroy(&name).await {
                        log::warn!("[{name}] Deferred destroy failed: {e}");
                    }
                });
            }
            Err(_) => log::warn!("[{name}] Lease dropped outside a runtime, session left alive"),
        }
    }
}
