//! Trajectory planner
//!
//! Turns a motion request into a fixed-capacity sequence of joint-angle
//! samples spaced one control tick apart. Every sample is validated
//! before the plan is handed out, so the executor never has to check
//! reachability itself.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use super::easing::Easing;
use super::kinematics::{inverse_kinematics, pose_of, IkError};
use super::pose::{CartesianPose, JointAngles};
use crate::config::MotionConfig;

/// Maximum number of samples in one trajectory
pub const TRAJECTORY_CAPACITY: usize = 61;

/// Maximum number of tick intervals in one trajectory
const MAX_INTERVALS: u32 = TRAJECTORY_CAPACITY as u32 - 1;

// A plan holds both endpoints plus every sample in between
const _: () = assert!(MAX_INTERVALS as usize + 1 <= TRAJECTORY_CAPACITY && MAX_INTERVALS >= 1);

/// Result code reported back to the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MoveStatus {
    /// Destination and path are reachable
    InRange = 0,
    /// Destination is outside the joint domain
    OutOfRangeInDestination = 1,
    /// Destination is fine but the straight line to it is not
    OutOfRangeInPath = 2,
    /// Rejected before solving, or only approximately reached
    OutOfRange = 3,
}

impl MoveStatus {
    /// Numeric status code
    pub fn code(self) -> u8 {
        self as u8
    }

    /// True if the arm will move at all
    pub fn is_moving(self) -> bool {
        matches!(self, MoveStatus::InRange | MoveStatus::OutOfRange)
    }
}

/// Why a request produced no trajectory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlanError {
    /// Non-finite input, or a target behind the base plane
    ///
    /// The nominal stretch/height envelope is not checked here. The joint
    /// domain after inverse kinematics is the real bound, and it reaches
    /// slightly past the envelope in places.
    Rejected,
    /// The final sample cannot be reached
    Destination,
    /// An intermediate sample of a linear path cannot be reached
    Path,
}

impl From<PlanError> for MoveStatus {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::Rejected => MoveStatus::OutOfRange,
            PlanError::Destination => MoveStatus::OutOfRangeInDestination,
            PlanError::Path => MoveStatus::OutOfRangeInPath,
        }
    }
}

/// How the path between start and target is shaped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PathKind {
    /// Straight line in Cartesian space
    #[default]
    Linear,
    /// Straight line in joint space
    Angles,
}

/// A single move request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionRequest {
    /// Target, or offsets when `relative` is set
    ///
    /// With `polar` set, `x` is the stretch, `y` the rotation in degrees
    /// and `z` the height.
    pub target: CartesianPose,
    /// Add `target` to the current pose instead of replacing it
    pub relative: bool,
    /// Interpret `target` as polar coordinates
    pub polar: bool,
    /// Requested move duration
    pub duration_ms: u32,
    /// Progress shaping
    pub easing: Easing,
    /// Drive the hand to `target.hand`; otherwise the hand holds still
    pub hand_control: bool,
    /// Path shape
    pub path: PathKind,
    /// Settle for the nearest point in the joint domain instead of failing
    pub closest_point: bool,
}

impl MotionRequest {
    /// Absolute rectangular move with defaults for everything else
    pub fn to(x: f32, y: f32, z: f32) -> Self {
        Self {
            target: CartesianPose::new(x, y, z, 0.0),
            relative: false,
            polar: false,
            duration_ms: 0,
            easing: Easing::default(),
            hand_control: false,
            path: PathKind::default(),
            closest_point: false,
        }
    }

    pub fn relative(mut self) -> Self {
        self.relative = true;
        self
    }

    pub fn polar(mut self) -> Self {
        self.polar = true;
        self
    }

    pub fn duration_ms(mut self, duration_ms: u32) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Also drive the hand servo to `angle`
    pub fn hand(mut self, angle: f32) -> Self {
        self.target.hand = angle;
        self.hand_control = true;
        self
    }

    pub fn path(mut self, path: PathKind) -> Self {
        self.path = path;
        self
    }

    pub fn closest_point(mut self) -> Self {
        self.closest_point = true;
        self
    }

    /// Absolute rectangular target given the current pose
    pub fn resolve(&self, current: &CartesianPose) -> CartesianPose {
        let hand = if self.hand_control {
            self.target.hand
        } else {
            current.hand
        };

        match (self.polar, self.relative) {
            (false, false) => CartesianPose::new(self.target.x, self.target.y, self.target.z, hand),
            (false, true) => CartesianPose::new(
                current.x + self.target.x,
                current.y + self.target.y,
                current.z + self.target.z,
                hand,
            ),
            (true, false) => {
                CartesianPose::from_polar(self.target.x, self.target.y, self.target.z, hand)
            }
            (true, true) => {
                let (stretch, rotation, height) = current.to_polar();
                CartesianPose::from_polar(
                    stretch + self.target.x,
                    rotation + self.target.y,
                    height + self.target.z,
                    hand,
                )
            }
        }
    }
}

/// Validated joint-angle samples, one per control tick
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    samples: Vec<JointAngles, TRAJECTORY_CAPACITY>,
    interval_ms: u32,
    kind: PathKind,
}

impl Trajectory {
    /// Number of samples, start and end included
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a planned trajectory
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[JointAngles] {
        &self.samples
    }

    pub fn sample(&self, index: usize) -> Option<&JointAngles> {
        self.samples.get(index)
    }

    /// First sample, equal to the starting angles
    pub fn first(&self) -> Option<&JointAngles> {
        self.samples.first()
    }

    /// Last sample, equal to the target angles
    pub fn last(&self) -> Option<&JointAngles> {
        self.samples.last()
    }

    /// Spacing between samples
    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Time offset of sample `index` from the start of the move
    pub fn sample_time_ms(&self, index: usize) -> u32 {
        index as u32 * self.interval_ms
    }

    /// Duration actually covered, which is shorter than the requested
    /// one when the request exceeded the sample capacity
    pub fn effective_duration_ms(&self) -> u32 {
        self.sample_time_ms(self.samples.len().saturating_sub(1))
    }

    pub fn kind(&self) -> PathKind {
        self.kind
    }
}

/// A trajectory ready to run and the status to report for it
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub trajectory: Trajectory,
    /// `InRange`, or `OutOfRange` for a closest-point approximation
    pub status: MoveStatus,
}

/// Number of tick intervals for a requested duration
fn interval_count(duration_ms: u32, interval_ms: u32) -> u32 {
    if interval_ms == 0 {
        return 1;
    }
    let rounded = duration_ms.saturating_add(interval_ms / 2) / interval_ms;
    rounded.clamp(1, MAX_INTERVALS)
}

/// Append a sample; `interval_count` keeps every plan within capacity
fn push_sample(samples: &mut Vec<JointAngles, TRAJECTORY_CAPACITY>, sample: JointAngles) {
    let pushed = samples.push(sample);
    debug_assert!(pushed.is_ok(), "trajectory capacity exceeded");
}

/// Plan a move from `current` according to `request`
///
/// Never partially commits: either every sample is reachable and the
/// whole trajectory is returned, or nothing is.
pub fn plan_move(
    current: &JointAngles,
    request: &MotionRequest,
    config: &MotionConfig,
) -> Result<Plan, PlanError> {
    let start_pose = pose_of(current);
    let target = request.resolve(&start_pose);

    if !target.is_finite() {
        return Err(PlanError::Rejected);
    }
    if target.y < 0.0 && !request.closest_point {
        return Err(PlanError::Rejected);
    }

    let intervals = interval_count(request.duration_ms, config.sample_interval_ms);

    let (end, path, status) = match inverse_kinematics(&target) {
        Ok(end) => (end, request.path, MoveStatus::InRange),
        Err(IkError::OutsideDomain(raw)) if request.closest_point => {
            // Nearest joint-domain point; the joint-space line to it is
            // reachable because the domain is convex
            (raw.clamped_to_domain(), PathKind::Angles, MoveStatus::OutOfRange)
        }
        Err(_) => return Err(PlanError::Destination),
    };

    let mut samples: Vec<JointAngles, TRAJECTORY_CAPACITY> = Vec::new();
    push_sample(&mut samples, *current);

    for i in 1..intervals {
        let t = request.easing.apply(i as f32 / intervals as f32);
        let sample = match path {
            PathKind::Angles => current.lerp(&end, t),
            PathKind::Linear => {
                let pose = start_pose.lerp(&target, t);
                inverse_kinematics(&pose).map_err(|_| PlanError::Path)?
            }
        };
        push_sample(&mut samples, sample);
    }
    push_sample(&mut samples, end);

    Ok(Plan {
        trajectory: Trajectory {
            samples,
            interval_ms: config.sample_interval_ms,
            kind: path,
        },
        status,
    })
}
