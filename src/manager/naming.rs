//! Session naming
//!
//! Names are `agents_<tag>_<agent>`. The tag is drawn once per process so two
//! orchestrators sharing a tmux server never address each other's sessions.

use uuid::Uuid;

use crate::types::{AgentId, SessionName};

/// Fixed prefix of every session name
pub const SESSION_PREFIX: &str = "agents";

/// Length of the per-process instance tag
pub const INSTANCE_TAG_LEN: usize = 4;

/// Derives session names for one orchestrator instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionNaming {
    instance_tag: String,
}

impl SessionNaming {
    /// Fresh random instance tag
    #[must_use]
    pub fn random() -> Self {
        let mut tag = Uuid::new_v4().simple().to_string();
        tag.truncate(INSTANCE_TAG_LEN);
        log::info!("Instance tag: {tag}");
        Self { instance_tag: tag }
    }

    /// Fixed instance tag
    pub fn with_tag(tag: impl Into<String>) -> Self {
        Self {
            instance_tag: tag.into(),
        }
    }

    /// The instance tag
    #[must_use]
    pub fn instance_tag(&self) -> &str {
        &self.instance_tag
    }

    /// Session name of a long-lived agent session
    #[must_use]
    pub fn session_name(&self, agent: &AgentId) -> SessionName {
        self.named(agent.as_str())
    }

    /// Session name of a dedicated fan-out slot
    #[must_use]
    pub fn slot_name(&self, kind: &AgentId, index: usize) -> SessionName {
        self.named(&format!("parallel_{kind}_{index}"))
    }

    fn named(&self, suffix: &str) -> SessionName {
        SessionName::new(format!("{SESSION_PREFIX}_{}_{suffix}", self.instance_tag))
    }
}

impl Default for SessionNaming {
    fn default() -> Self {
        Self::random()
    }
}
