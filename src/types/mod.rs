//! Type definitions for the agent bridge
//!
//! - [`identifiers`] - Type-safe ID wrappers (`SessionName`, `RequestToken`, `AgentId`)
//! - [`agent`] - Agent descriptors and response detection modes
//! - [`events`] - Pending lifecycle events
//! - [`status`] - Request outcomes and status snapshots

pub mod agent;
pub mod events;
pub mod identifiers;
pub mod status;

pub use agent::{AgentConfig, AgentConfigBuilder, LogFormat, LogLocation, ResponseDetection};
pub use events::{EventKind, PendingEvent};
pub use identifiers::{AgentId, RequestToken, SessionName};
pub use status::{AgentStatus, PromptOutcome, PromptRequest};
