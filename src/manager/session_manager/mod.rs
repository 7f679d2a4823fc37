//! Session manager implementation
//!
//! This module is organized into logical submodules:
//! - `core`: Core struct, constructors, and registry queries
//! - `lifecycle`: Session creation and destruction
//! - `interaction`: Text injection, control keys, and screen capture

mod core;
mod interaction;
mod lifecycle;

pub use self::core::{InFlightGuard, SessionManager};
