//! Error types for the agent bridge

use thiserror::Error;

/// Main error type for the agent bridge
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Terminal session vanished from the backend
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Agent never reached a recognizable ready state
    #[error("Session {session} ready timeout after {timeout_ms}ms")]
    ReadyTimeout {
        /// Session name
        session: String,
        /// Budget that elapsed
        timeout_ms: u64,
    },

    /// No response carrying the request marker appeared in time
    #[error("Response timeout after {timeout_ms}ms (requestId: {request_id})")]
    ResponseTimeout {
        /// Request token that was awaited
        request_id: String,
        /// Budget that elapsed
        timeout_ms: u64,
    },

    /// The text-delivery command itself failed
    #[error("Injection into {session} failed: {message}")]
    InjectionFailed {
        /// Session name
        session: String,
        /// Backend failure description
        message: String,
    },

    /// Session existed at submission but disappeared before the answer arrived
    #[error("Session {session} terminated by user (requestId: {request_id})")]
    SessionTerminatedByUser {
        /// Session name
        session: String,
        /// Request token that was outstanding
        request_id: String,
    },

    /// Terminal multiplexer command failed
    #[error("Terminal backend error: {0}")]
    Backend(String),

    /// Terminal multiplexer binary is not available
    #[error("Terminal backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Agent identity not present in the registry
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decode error
    #[error("JSON decode error: {0}")]
    JsonDecode(#[from] serde_json::Error),
}

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    /// Create a session not found error
    pub fn session_not_found(session: impl Into<String>) -> Self {
        Self::SessionNotFound(session.into())
    }

    /// Create a ready timeout error
    pub fn ready_timeout(session: impl Into<String>, timeout: std::time::Duration) -> Self {
        Self::ReadyTimeout {
            session: session.into(),
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    /// Create a response timeout error
    pub fn response_timeout(request_id: impl Into<String>, timeout: std::time::Duration) -> Self {
        Self::ResponseTimeout {
            request_id: request_id.into(),
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    /// Create an injection failure
    pub fn injection_failed(session: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InjectionFailed {
            session: session.into(),
            message: message.into(),
        }
    }

    /// Create a user-termination error
    pub fn terminated_by_user(session: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::SessionTerminatedByUser {
            session: session.into(),
            request_id: request_id.into(),
        }
    }

    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create an unknown agent error
    pub fn unknown_agent(agent: impl Into<String>) -> Self {
        Self::UnknownAgent(agent.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// True for the timeout family (ready or response)
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ReadyTimeout { .. } | Self::ResponseTimeout { .. })
    }
}
