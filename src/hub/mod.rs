//! Agent hub
//!
//! Composition object that drives named agents through one session manager:
//! - `core`: Struct, constructors, reaper ownership, and shutdown
//! - `ask`: Session setup, correlated prompts, and stop
//! - `status`: Status snapshots, events, and fan-out

mod ask;
mod core;
mod status;

pub use self::core::AgentHub;
