//! Joint-space and Cartesian pose types
//!
//! Joint angles are always in degrees. The left and right links form a
//! four-bar linkage, so besides their individual limits the sum of the
//! two is bounded as well.

use serde::{Deserialize, Serialize};

/// Rotation servo limits (degrees)
pub const ROTATION_MIN_ANGLE: f32 = 0.0;
pub const ROTATION_MAX_ANGLE: f32 = 180.0;

/// Individual left/right link limits (degrees)
pub const LINK_MIN_ANGLE: f32 = 5.0;
pub const LINK_MAX_ANGLE: f32 = 120.0;

/// Limits on left + right (degrees)
pub const LINK_SUM_MIN_ANGLE: f32 = 30.0;
pub const LINK_SUM_MAX_ANGLE: f32 = 150.0;

/// Hand rotation servo limits (degrees)
pub const HAND_MIN_ANGLE: f32 = 0.0;
pub const HAND_MAX_ANGLE: f32 = 180.0;

/// Servo identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Joint {
    /// Base rotation
    Rotation = 0,
    /// Left (lower) link
    Left = 1,
    /// Right (upper) link
    Right = 2,
    /// Wrist rotation
    Hand = 3,
}

impl Joint {
    /// All joints in servo-number order
    pub const ALL: [Joint; 4] = [Joint::Rotation, Joint::Left, Joint::Right, Joint::Hand];

    /// Joints with a persisted feedback calibration
    pub const CALIBRATED: [Joint; 3] = [Joint::Rotation, Joint::Left, Joint::Right];

    /// Servo number used by the host command set
    pub fn index(self) -> usize {
        self as usize
    }

    /// Joint from servo number
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Joint::Rotation),
            1 => Some(Joint::Left),
            2 => Some(Joint::Right),
            3 => Some(Joint::Hand),
            _ => None,
        }
    }
}

/// Angles of all four servos
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JointAngles {
    pub rotation: f32,
    pub left: f32,
    pub right: f32,
    pub hand: f32,
}

impl JointAngles {
    pub const fn new(rotation: f32, left: f32, right: f32, hand: f32) -> Self {
        Self {
            rotation,
            left,
            right,
            hand,
        }
    }

    /// Angle of a single joint
    pub fn get(&self, joint: Joint) -> f32 {
        match joint {
            Joint::Rotation => self.rotation,
            Joint::Left => self.left,
            Joint::Right => self.right,
            Joint::Hand => self.hand,
        }
    }

    /// Replace the angle of a single joint
    pub fn set(&mut self, joint: Joint, angle: f32) {
        match joint {
            Joint::Rotation => self.rotation = angle,
            Joint::Left => self.left = angle,
            Joint::Right => self.right = angle,
            Joint::Hand => self.hand = angle,
        }
    }

    /// Check every joint and the link sum against the mechanical domain
    pub fn within_domain(&self) -> bool {
        let sum = self.left + self.right;
        in_range(self.rotation, ROTATION_MIN_ANGLE, ROTATION_MAX_ANGLE)
            && in_range(self.left, LINK_MIN_ANGLE, LINK_MAX_ANGLE)
            && in_range(self.right, LINK_MIN_ANGLE, LINK_MAX_ANGLE)
            && in_range(sum, LINK_SUM_MIN_ANGLE, LINK_SUM_MAX_ANGLE)
            && in_range(self.hand, HAND_MIN_ANGLE, HAND_MAX_ANGLE)
    }

    /// Range `joint` may take with every other joint held where it is
    pub fn limits(&self, joint: Joint) -> (f32, f32) {
        match joint {
            Joint::Rotation => (ROTATION_MIN_ANGLE, ROTATION_MAX_ANGLE),
            Joint::Hand => (HAND_MIN_ANGLE, HAND_MAX_ANGLE),
            Joint::Left | Joint::Right => {
                let other = if joint == Joint::Left { self.right } else { self.left };
                let min = LINK_MIN_ANGLE.max(LINK_SUM_MIN_ANGLE - other);
                let max = LINK_MAX_ANGLE.min(LINK_SUM_MAX_ANGLE - other);
                (min, max.max(min))
            }
        }
    }

    /// Pull every joint onto the nearest point of the domain
    ///
    /// Joints are clamped individually first. If the link sum is still
    /// outside its band the right link absorbs the difference, which is
    /// always possible once both links sit inside their own limits.
    pub fn clamped_to_domain(&self) -> Self {
        let rotation = self.rotation.clamp(ROTATION_MIN_ANGLE, ROTATION_MAX_ANGLE);
        let left = self.left.clamp(LINK_MIN_ANGLE, LINK_MAX_ANGLE);
        let mut right = self.right.clamp(LINK_MIN_ANGLE, LINK_MAX_ANGLE);
        let hand = self.hand.clamp(HAND_MIN_ANGLE, HAND_MAX_ANGLE);

        let sum = left + right;
        if sum > LINK_SUM_MAX_ANGLE {
            right = LINK_SUM_MAX_ANGLE - left;
        } else if sum < LINK_SUM_MIN_ANGLE {
            right = LINK_SUM_MIN_ANGLE - left;
        }

        Self {
            rotation,
            left,
            right,
            hand,
        }
    }

    /// Component-wise interpolation, `t` in [0, 1]
    pub fn lerp(&self, to: &Self, t: f32) -> Self {
        Self {
            rotation: lerp(self.rotation, to.rotation, t),
            left: lerp(self.left, to.left, t),
            right: lerp(self.right, to.right, t),
            hand: lerp(self.hand, to.hand, t),
        }
    }
}

/// End-effector position in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Straight-line distance to another position
    pub fn distance(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        libm::sqrtf(dx * dx + dy * dy + dz * dz)
    }
}

/// End-effector position plus wrist angle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CartesianPose {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Hand servo angle in degrees
    pub hand: f32,
}

impl CartesianPose {
    pub const fn new(x: f32, y: f32, z: f32, hand: f32) -> Self {
        Self { x, y, z, hand }
    }

    /// Pose from polar coordinates
    ///
    /// `stretch` is the horizontal distance from the base axis,
    /// `rotation` the bearing in degrees and `height` the z coordinate.
    pub fn from_polar(stretch: f32, rotation: f32, height: f32, hand: f32) -> Self {
        let rad = rotation.to_radians();
        Self {
            x: stretch * libm::cosf(rad),
            y: stretch * libm::sinf(rad),
            z: height,
            hand,
        }
    }

    /// (stretch, rotation in degrees, height)
    pub fn to_polar(&self) -> (f32, f32, f32) {
        let stretch = libm::sqrtf(self.x * self.x + self.y * self.y);
        let rotation = libm::atan2f(self.y, self.x).to_degrees();
        (stretch, rotation, self.z)
    }

    /// Position without the hand angle
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y, self.z)
    }

    /// Component-wise interpolation, `t` in [0, 1]
    pub fn lerp(&self, to: &Self, t: f32) -> Self {
        Self {
            x: lerp(self.x, to.x, t),
            y: lerp(self.y, to.y, t),
            z: lerp(self.z, to.z, t),
            hand: lerp(self.hand, to.hand, t),
        }
    }

    /// True when every component is a finite number
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.hand.is_finite()
    }
}

fn in_range(value: f32, min: f32, max: f32) -> bool {
    value >= min && value <= max
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_index_roundtrip() {
        for joint in Joint::ALL {
            assert_eq!(Joint::from_index(joint.index() as u8), Some(joint));
        }
        assert_eq!(Joint::from_index(4), None);
    }

    #[test]
    fn test_domain_limits() {
        assert!(JointAngles::new(90.0, 60.0, 50.0, 90.0).within_domain());

        // Individual link limit
        assert!(!JointAngles::new(90.0, 4.0, 50.0, 90.0).within_domain());
        assert!(!JointAngles::new(90.0, 60.0, 121.0, 90.0).within_domain());

        // Link sum limits
        assert!(!JointAngles::new(90.0, 100.0, 60.0, 90.0).within_domain());
        assert!(!JointAngles::new(90.0, 10.0, 10.0, 90.0).within_domain());

        // Rotation and hand
        assert!(!JointAngles::new(-1.0, 60.0, 50.0, 90.0).within_domain());
        assert!(!JointAngles::new(90.0, 60.0, 50.0, 181.0).within_domain());

        // NaN is never in the domain
        assert!(!JointAngles::new(f32::NAN, 60.0, 50.0, 90.0).within_domain());
    }

    #[test]
    fn test_joint_limits_follow_link_sum() {
        let angles = JointAngles::new(90.0, 60.0, 50.0, 90.0);
        assert_eq!(angles.limits(Joint::Rotation), (0.0, 180.0));
        assert_eq!(angles.limits(Joint::Hand), (0.0, 180.0));
        assert_eq!(angles.limits(Joint::Left), (5.0, 100.0));
        assert_eq!(angles.limits(Joint::Right), (5.0, 90.0));

        // A short partner raises the floor
        let folded = JointAngles::new(90.0, 10.0, 15.0, 90.0);
        assert_eq!(folded.limits(Joint::Right), (20.0, 120.0));
    }

    #[test]
    fn test_clamp_lands_in_domain() {
        let wild = [
            JointAngles::new(-20.0, 0.0, 0.0, 200.0),
            JointAngles::new(200.0, 130.0, 130.0, -5.0),
            JointAngles::new(90.0, 100.0, 100.0, 90.0),
            JointAngles::new(90.0, 10.0, 10.0, 90.0),
        ];

        for angles in wild {
            assert!(angles.clamped_to_domain().within_domain(), "{:?}", angles);
        }
    }

    #[test]
    fn test_clamp_keeps_valid_angles() {
        let angles = JointAngles::new(45.0, 70.0, 40.0, 10.0);
        assert_eq!(angles.clamped_to_domain(), angles);
    }

    #[test]
    fn test_joint_accessors() {
        let mut angles = JointAngles::default();
        for (i, joint) in Joint::ALL.iter().enumerate() {
            angles.set(*joint, i as f32 * 10.0);
        }
        assert_eq!(angles, JointAngles::new(0.0, 10.0, 20.0, 30.0));
        assert_eq!(angles.get(Joint::Right), 20.0);
    }

    #[test]
    fn test_polar_conversion() {
        let pose = CartesianPose::from_polar(200.0, 90.0, 100.0, 45.0);
        assert!(pose.x.abs() < 1e-3);
        assert!((pose.y - 200.0).abs() < 1e-3);
        assert_eq!(pose.z, 100.0);

        let (stretch, rotation, height) = pose.to_polar();
        assert!((stretch - 200.0).abs() < 1e-3);
        assert!((rotation - 90.0).abs() < 1e-3);
        assert_eq!(height, 100.0);
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = CartesianPose::new(0.0, 200.0, 100.0, 90.0);
        let b = CartesianPose::new(150.0, 0.0, 150.0, 30.0);
        assert_eq!(a.lerp(&b, 0.0), a);
        let mid = a.lerp(&b, 0.5);
        assert_eq!(mid, CartesianPose::new(75.0, 100.0, 125.0, 60.0));
    }
}
