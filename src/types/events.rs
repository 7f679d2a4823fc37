//! Lifecycle events queued per agent

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of a pending lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A tool invocation finished
    ToolComplete,
    /// The session went idle
    SessionIdle,
    /// A correlated answer arrived
    MessageComplete,
    /// A request failed
    Error,
}

impl EventKind {
    /// Wire name of the kind
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ToolComplete => "tool_complete",
            Self::SessionIdle => "session_idle",
            Self::MessageComplete => "message_complete",
            Self::Error => "error",
        }
    }
}

impl std::str::FromStr for EventKind {
    type Err = crate::error::BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tool_complete" => Ok(Self::ToolComplete),
            "session_idle" => Ok(Self::SessionIdle),
            "message_complete" => Ok(Self::MessageComplete),
            "error" => Ok(Self::Error),
            other => Err(crate::error::BridgeError::invalid_config(format!(
                "unknown event type: {other}"
            ))),
        }
    }
}

/// Event observed for an agent and not yet drained by a consumer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingEvent {
    /// Event kind
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// When the outcome was observed
    pub timestamp: DateTime<Utc>,
    /// Answer text or error message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl PendingEvent {
    /// Create an event stamped now
    pub fn new(kind: EventKind, data: Option<String>) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
            data,
        }
    }

    /// A `message_complete` event carrying the answer
    pub fn message_complete(answer: impl Into<String>) -> Self {
        Self::new(EventKind::MessageComplete, Some(answer.into()))
    }

    /// An `error` event carrying the failure message
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(EventKind::Error, Some(message.into()))
    }
}
