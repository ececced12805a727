//! Hardware abstraction traits
//!
//! These traits define the interface between the motion logic and the
//! board that actually drives servos and reads their feedback pots.

pub mod effector;
pub mod servo;

pub use effector::Effector;
pub use servo::{ArmHardware, HardwareError, ServoDriver};
