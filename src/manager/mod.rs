//! Terminal session management
//!
//! Provides `SessionManager` for creating, addressing, typing into and
//! destroying named terminal sessions, reconciling its in-memory registry
//! against the live backend.
//!
//! # Module Structure
//!
//! - `session_manager` - Core `SessionManager` with public API
//! - `session` - Tracked session record
//! - `naming` - Session naming scheme
//! - `lease` - Guard that destroys a dedicated session
//! - `reaper` - Background inactivity reaper

mod lease;
mod naming;
mod reaper;
mod session;
mod session_manager;

pub use lease::SessionLease;
pub use naming::{INSTANCE_TAG_LEN, SESSION_PREFIX, SessionNaming};
pub use reaper::spawn_reaper;
pub use session::Session;
pub use session_manager::{InFlightGuard, SessionManager};
