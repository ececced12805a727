//! Servo output and feedback traits

use super::effector::Effector;
use crate::motion::Joint;

/// Errors from servo outputs and feedback inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HardwareError {
    /// PWM output rejected the command
    Output,
    /// ADC conversion failed
    Conversion,
}

/// A single hobby servo
pub trait ServoDriver {
    /// Command the servo to `angle` degrees
    ///
    /// Implementations clamp to the servo's travel. A detached servo
    /// remembers the angle but does not drive it.
    fn set_angle(&mut self, angle: f32) -> Result<(), HardwareError>;

    /// Start or stop driving the output
    ///
    /// A detached servo goes limp so the arm can be moved by hand.
    fn set_attached(&mut self, attached: bool) -> Result<(), HardwareError>;

    /// Check if the output is being driven
    fn is_attached(&self) -> bool;
}

/// Everything the motion executor needs from the board
///
/// Joint angles are in degrees, already validated against the joint
/// domain by the time they get here.
pub trait ArmHardware: Effector {
    /// Drive one servo
    fn write_servo(&mut self, joint: Joint, angle: f32) -> Result<(), HardwareError>;

    /// Attach or detach one servo
    fn set_servo_attached(&mut self, joint: Joint, attached: bool) -> Result<(), HardwareError>;

    /// Raw feedback reading of one servo
    fn read_feedback(&mut self, joint: Joint) -> Result<u16, HardwareError>;

    /// Attach or detach all four servos, stopping at the first failure
    fn set_attached(&mut self, attached: bool) -> Result<(), HardwareError> {
        for joint in Joint::ALL {
            self.set_servo_attached(joint, attached)?;
        }
        Ok(())
    }

    /// Drive all four servos, stopping at the first failure
    fn write_angles(&mut self, angles: &crate::motion::JointAngles) -> Result<(), HardwareError> {
        for joint in Joint::ALL {
            self.write_servo(joint, angles.get(joint))?;
        }
        Ok(())
    }
}
