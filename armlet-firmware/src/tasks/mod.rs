//! Embassy async tasks
//!
//! The whole arm runs in one task; everything else talks to it through
//! the command channel.

pub mod control;

pub use control::control_task;
