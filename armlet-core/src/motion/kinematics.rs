//! Forward and inverse kinematics of the four-bar arm
//!
//! All functions here are pure. Lengths are millimetres, angles degrees.
//!
//! ```text
//!            L4 (upper link, driven by the right servo)
//!      o-----------------o  end effector
//!     /
//!    / L3 (lower link, driven by the left servo)
//!   /
//!  o---- L2 (horizontal offset)
//!  |
//!  | L1 (base height)
//! ===
//! ```

use super::pose::{CartesianPose, JointAngles, Position};
use crate::calibration::CalibrationRecord;

/// Base height above the table
pub const L1: f32 = 90.0;
/// Horizontal offset from the rotation axis to the shoulder
pub const L2: f32 = 21.17;
/// Lower link length
pub const L3: f32 = 148.25;
/// Upper link length
pub const L4: f32 = 160.2;
/// Upper link length in units of the lower link
pub const L43: f32 = L4 / L3;

/// Inverse kinematics failure
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IkError {
    /// Target is too far or too close, or the maths produced NaN
    NoSolution,
    /// A solution exists but violates the joint domain
    OutsideDomain(JointAngles),
}

/// Base rotation for a point in the horizontal plane
///
/// 90° on the y axis, otherwise the bearing from the x axis folded into
/// the half-plane the base can reach.
fn base_rotation(x: f32, y: f32) -> f32 {
    if x == 0.0 {
        if y < 0.0 {
            -90.0
        } else {
            90.0
        }
    } else if x > 0.0 {
        libm::atanf(y / x).to_degrees()
    } else {
        180.0 + libm::atanf(y / x).to_degrees()
    }
}

/// Solve the linkage without checking the joint domain
///
/// The hand angle is passed through untouched.
pub fn solve(pose: &CartesianPose) -> Option<JointAngles> {
    if !pose.is_finite() {
        return None;
    }

    let rotation = base_rotation(pose.x, pose.y);
    let stretch = libm::sqrtf(pose.x * pose.x + pose.y * pose.y);

    // Work in units of L3 relative to the shoulder joint
    let x_in = (stretch - L2) / L3;
    let z_in = (pose.z - L1) / L3;
    let d_sq = x_in * x_in + z_in * z_in;
    let d = libm::sqrtf(d_sq);
    if d == 0.0 {
        return None;
    }
    let phi = libm::atan2f(z_in, x_in);

    let cos_left = (d_sq + 1.0 - L43 * L43) / (2.0 * d);
    let cos_right = (d_sq + L43 * L43 - 1.0) / (2.0 * L43 * d);
    if !(-1.0..=1.0).contains(&cos_left) || !(-1.0..=1.0).contains(&cos_right) {
        return None;
    }

    let left = (libm::acosf(cos_left) + phi).to_degrees();
    let right = (libm::acosf(cos_right) - phi).to_degrees();

    let angles = JointAngles::new(rotation, left, right, pose.hand);
    let finite = angles.rotation.is_finite() && angles.left.is_finite() && angles.right.is_finite();
    finite.then_some(angles)
}

/// Joint angles placing the end effector at `pose`
///
/// Succeeds only when the solution lies inside the joint domain; nothing
/// is clamped here.
pub fn inverse_kinematics(pose: &CartesianPose) -> Result<JointAngles, IkError> {
    let angles = solve(pose).ok_or(IkError::NoSolution)?;
    if angles.within_domain() {
        Ok(angles)
    } else {
        Err(IkError::OutsideDomain(angles))
    }
}

/// End-effector position for a set of joint angles
pub fn forward_kinematics(angles: &JointAngles) -> Position {
    let rot = angles.rotation.to_radians();
    let left = angles.left.to_radians();
    let right = angles.right.to_radians();

    let stretch = L3 * libm::cosf(left) + L4 * libm::cosf(right) + L2;
    let height = L3 * libm::sinf(left) - L4 * libm::sinf(right) + L1;

    Position::new(
        stretch * libm::cosf(rot),
        stretch * libm::sinf(rot),
        height,
    )
}

/// Forward kinematics keeping the hand angle
pub fn pose_of(angles: &JointAngles) -> CartesianPose {
    let p = forward_kinematics(angles);
    CartesianPose::new(p.x, p.y, p.z, angles.hand)
}

/// Convert a raw feedback reading to degrees
pub fn analog_to_angle(raw: u16, calibration: &CalibrationRecord) -> f32 {
    calibration.slope * f32::from(raw) + calibration.intercept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::pose::{LINK_SUM_MAX_ANGLE, LINK_SUM_MIN_ANGLE};
    use proptest::prelude::*;

    fn assert_close(a: f32, b: f32, tol: f32) {
        assert!((a - b).abs() <= tol, "{} vs {}", a, b);
    }

    #[test]
    fn test_home_pose() {
        let angles = inverse_kinematics(&CartesianPose::new(0.0, 200.0, 100.0, 90.0)).unwrap();
        assert_close(angles.rotation, 90.0, 1e-4);
        assert_close(angles.left, 60.9, 0.2);
        assert_close(angles.right, 48.25, 0.2);
        assert_eq!(angles.hand, 90.0);
    }

    #[test]
    fn test_rotation_quadrants() {
        assert_close(base_rotation(100.0, 0.0), 0.0, 1e-4);
        assert_close(base_rotation(100.0, 100.0), 45.0, 1e-4);
        assert_close(base_rotation(0.0, 100.0), 90.0, 1e-4);
        assert_close(base_rotation(-100.0, 100.0), 135.0, 1e-4);
        assert_close(base_rotation(-100.0, 0.0), 180.0, 1e-4);
    }

    #[test]
    fn test_unreachable_is_no_solution() {
        let far = CartesianPose::new(1000.0, 0.0, 0.0, 90.0);
        assert_eq!(inverse_kinematics(&far), Err(IkError::NoSolution));

        let nan = CartesianPose::new(f32::NAN, 100.0, 100.0, 90.0);
        assert_eq!(inverse_kinematics(&nan), Err(IkError::NoSolution));
    }

    #[test]
    fn test_outside_domain_carries_angles() {
        // Reachable but needs the base turned past 180°
        let behind = CartesianPose::new(-150.0, -10.0, 150.0, 90.0);
        match inverse_kinematics(&behind) {
            Err(IkError::OutsideDomain(angles)) => assert!(angles.rotation > 180.0),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_round_trip_target() {
        let target = CartesianPose::new(150.0, 0.0, 150.0, 90.0);
        let angles = inverse_kinematics(&target).unwrap();
        let back = forward_kinematics(&angles);
        assert!(back.distance(&target.position()) < 1.0);
    }

    #[test]
    fn test_analog_to_angle() {
        let record = CalibrationRecord::new(2.0, 10.0);
        assert_close(analog_to_angle(0, &record), 10.0, 1e-6);
        assert_close(analog_to_angle(40, &record), 90.0, 1e-6);
    }

    proptest! {
        #[test]
        fn prop_round_trip(
            rotation in 0.0f32..180.0,
            left in 5.0f32..120.0,
            right in 5.0f32..120.0,
        ) {
            let sum = left + right;
            prop_assume!(sum >= LINK_SUM_MIN_ANGLE && sum <= LINK_SUM_MAX_ANGLE);

            let angles = JointAngles::new(rotation, left, right, 90.0);
            let p = forward_kinematics(&angles);
            let target = CartesianPose::new(p.x, p.y, p.z, 90.0);

            let solved = solve(&target);
            prop_assert!(solved.is_some());
            let back = forward_kinematics(&solved.unwrap());
            prop_assert!(back.distance(&p) < 1.0, "{:?} -> {:?}", p, back);
        }
    }
}
