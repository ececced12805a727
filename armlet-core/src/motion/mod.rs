//! Motion model
//!
//! Linkage geometry, easing profiles and the trajectory planner that
//! combines them into validated, sampled paths.

pub mod easing;
pub mod kinematics;
pub mod planner;
pub mod pose;

pub use easing::Easing;
pub use kinematics::{forward_kinematics, inverse_kinematics, IkError};
pub use planner::{
    plan_move, MotionRequest, MoveStatus, PathKind, Plan, PlanError, Trajectory,
    TRAJECTORY_CAPACITY,
};
pub use pose::{CartesianPose, Joint, JointAngles, Position};
