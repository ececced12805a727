//! Motion executor
//!
//! Steps planned trajectories, captures learned motion and replays it.

mod active;
pub mod arm;
mod session;

pub use active::ActiveMove;
pub use arm::{home_angles, Arm, ArmEvent, ArmState, ServoError, HOME_POSE};
