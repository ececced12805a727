//! Operating mode state machine
//!
//! The arm is always in exactly one mode. Every (mode, event) pair is
//! either a defined transition or an explicit rejection.

pub mod events;
pub mod machine;

pub use events::ModeEvent;
pub use machine::{Mode, ModeError};
