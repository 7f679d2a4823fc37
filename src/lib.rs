//! # tmux agent bridge
//!
//! Drive interactive command-line agents (Codex, Gemini, Claude Code, or
//! anything else with a terminal UI) as if they were callable functions.
//! Each agent runs in its own tmux session, which stays visible and usable
//! by a human; prompts are typed in, and answers are correlated back through
//! the agent's own log files or its rendered screen.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tmux_agent_bridge::{AgentHub, AgentId, AgentRegistry, HubSettings, PromptRequest, TmuxBackend};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hub = AgentHub::new(TmuxBackend::new()?, AgentRegistry::builtin(), HubSettings::default());
//! hub.start_reaper();
//!
//! let request = PromptRequest::new("/path/to/project", "Summarize src/lib.rs");
//! let outcome = hub.ask(&AgentId::new("codex_medium"), &request).await;
//! println!("{}", outcome.text());
//!
//! hub.shutdown().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## How an answer is found
//!
//! 1. The prompt is wrapped as `[RQ-<token>] <prompt> ... End your response with "[ANS-<token>]"`.
//! 2. It is typed into the session with the agent's [`InjectionStrategy`].
//! 3. The [`correlate::Correlator`] polls the agent's transcript directory
//!    (or screen) for the newest record containing `[ANS-<token>]`.
//!
//! ## Testing without tmux
//!
//! [`MemoryBackend`] keeps scripted sessions in process; a responder closure
//! decides what the "agent" prints for each submitted line.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod correlate;
pub mod detect;
pub mod error;
pub mod events;
pub mod fanout;
pub mod hub;
pub mod manager;
pub mod registry;
pub mod terminal;
pub mod types;
pub mod wait;

// Re-export commonly used types for external API
pub use config::HubSettings;
pub use error::{BridgeError, Result};
pub use events::EventQueue;
pub use fanout::{FanOutCoordinator, FanOutEntry, FanOutReport};
pub use hub::AgentHub;
pub use manager::{InFlightGuard, Session, SessionLease, SessionManager, SessionNaming};
pub use registry::AgentRegistry;
pub use terminal::{InjectionStrategy, Key, MemoryBackend, Reaction, TerminalBackend, TmuxBackend};

// Re-export type submodules for flat public API
pub use types::agent::{AgentConfig, AgentConfigBuilder, LogFormat, LogLocation, ResponseDetection};
pub use types::events::{EventKind, PendingEvent};
pub use types::identifiers::{AgentId, RequestToken, SessionName};
pub use types::status::{AgentStatus, PromptOutcome, PromptRequest};

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
