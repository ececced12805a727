//! End-effector outputs
//!
//! The gripper and the suction pump are plain on/off outputs. The core
//! only forwards requests to them.

/// Gripper and pump outputs
pub trait Effector {
    /// Close (`true`) or open the gripper
    fn set_gripper(&mut self, catch: bool);

    /// Run (`true`) or stop the suction pump
    fn set_pump(&mut self, on: bool);
}
