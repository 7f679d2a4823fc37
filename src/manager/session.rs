//! Tracked session record

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::SessionName;

/// Cache entry for one live terminal session
///
/// The backend is authoritative for liveness; this record only carries the
/// metadata the backend does not keep.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    /// Unique session name
    pub name: SessionName,

    /// Working directory the session was opened in
    pub work_dir: PathBuf,

    /// When the session was created
    pub created_at: DateTime<Utc>,

    /// Last successful injection or answer
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub(super) fn new(name: SessionName, work_dir: PathBuf) -> Self {
        let now = Utc::now();
        Self {
            name,
            work_dir,
            created_at: now,
            last_activity: now,
        }
    }

    /// Time since the last activity, zero if `now` precedes it
    #[must_use]
    pub fn idle_for(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.last_activity)
            .to_std()
            .unwrap_or_default()
    }
}
