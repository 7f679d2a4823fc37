//! Results handed back to collaborators

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identifiers::{AgentId, SessionName};

/// Request parameters for asking an agent
#[derive(Debug, Clone)]
pub struct PromptRequest {
    /// Working context the agent session is bound to
    pub work_dir: std::path::PathBuf,
    /// Raw prompt text
    pub prompt: String,
    /// Whether the agent may create, modify or delete files
    pub allow_file_edits: bool,
}

impl PromptRequest {
    /// Read-only request (file edits forbidden)
    pub fn new(work_dir: impl Into<std::path::PathBuf>, prompt: impl Into<String>) -> Self {
        Self {
            work_dir: work_dir.into(),
            prompt: prompt.into(),
            allow_file_edits: false,
        }
    }

    /// Allow or forbid file edits
    #[must_use]
    pub fn allow_file_edits(mut self, allow: bool) -> Self {
        self.allow_file_edits = allow;
        self
    }
}

/// Structured result of one correlated request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptOutcome {
    /// Agent that was asked
    pub agent: AgentId,
    /// Session that served the request
    pub session_name: SessionName,
    /// TRUE if an answer was extracted
    pub success: bool,
    /// Extracted answer text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Human-readable failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Request token, once one was generated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Wall time spent on the request
    pub duration_ms: u64,
}

impl PromptOutcome {
    /// Answer text or error message, whichever is present
    #[must_use]
    pub fn text(&self) -> &str {
        self.response
            .as_deref()
            .or(self.error.as_deref())
            .unwrap_or("No response")
    }
}

/// Status snapshot of one agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStatus {
    /// Agent identity
    pub agent: AgentId,
    /// TRUE if the agent's session is alive in the backend
    pub connected: bool,
    /// Session the agent is addressed by
    pub session_name: SessionName,
    /// Last injection or answer time, if the session is tracked
    pub last_activity: Option<DateTime<Utc>>,
    /// Number of queued events
    pub pending_events: usize,
}
