//! Typed command surface
//!
//! The dispatcher turns host input into `Command`s and hands them to
//! [`Arm::execute`]; each produces exactly one `Reply`.

use armlet_hal::ByteStore;

use crate::calibration::{CalibrationError, CalibrationRecord};
use crate::executor::{Arm, ServoError};
use crate::motion::{CartesianPose, Joint, MotionRequest, MoveStatus};
use crate::state::{Mode, ModeError, ModeEvent};
use crate::traits::{ArmHardware, HardwareError};

/// Requests the core accepts
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Plan and start a move
    MoveTo(MotionRequest),
    /// Read a servo's feedback, raw ADC count or calibrated degrees
    ReadServoAngle { joint: Joint, raw: bool },
    /// Pose of the last committed angles
    CurrentPose,
    /// Mode change
    SetMode(ModeEvent),
    /// Active mode
    GetMode,
    /// Close or open the gripper
    Gripper(bool),
    /// Run or stop the pump
    Pump(bool),
    /// Persist a feedback calibration
    StoreCalibration {
        joint: Joint,
        record: CalibrationRecord,
    },
    /// Drive one servo directly
    WriteServoAngle { joint: Joint, angle: f32 },
    Attach(Joint),
    Detach(Joint),
    AttachAll,
    DetachAll,
}

/// Answers to commands
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    Move(MoveStatus),
    Angle(f32),
    Pose(CartesianPose),
    Mode(Mode),
    ModeRejected(ModeError),
    Calibration(Result<(), CalibrationError>),
    Hardware(HardwareError),
    /// The active mode owns the servos
    Busy(Mode),
    Done,
}

impl From<Result<(), HardwareError>> for Reply {
    fn from(result: Result<(), HardwareError>) -> Self {
        match result {
            Ok(()) => Reply::Done,
            Err(e) => Reply::Hardware(e),
        }
    }
}

impl<B: ByteStore, H: ArmHardware> Arm<B, H> {
    /// Run one command
    pub fn execute(&mut self, command: Command, now_ms: u64) -> Reply {
        match command {
            Command::MoveTo(request) => Reply::Move(self.move_to(&request, now_ms)),
            Command::ReadServoAngle { joint, raw } => match self.read_servo_angle(joint, raw) {
                Ok(angle) => Reply::Angle(angle),
                Err(e) => Reply::Hardware(e),
            },
            Command::CurrentPose => Reply::Pose(self.current_pose()),
            Command::SetMode(event) => match self.set_mode(event, now_ms) {
                Ok(mode) => Reply::Mode(mode),
                Err(e) => Reply::ModeRejected(e),
            },
            Command::GetMode => Reply::Mode(self.mode()),
            Command::Gripper(catch) => {
                self.gripper_catch(catch);
                Reply::Done
            }
            Command::Pump(on) => {
                self.pump_catch(on);
                Reply::Done
            }
            Command::StoreCalibration { joint, record } => {
                Reply::Calibration(self.store_calibration(joint, record))
            }
            Command::WriteServoAngle { joint, angle } => {
                match self.write_servo_angle(joint, angle) {
                    Ok(angle) => Reply::Angle(angle),
                    Err(ServoError::Busy(mode)) => Reply::Busy(mode),
                    Err(ServoError::Hardware(e)) => Reply::Hardware(e),
                }
            }
            Command::Attach(joint) => self.attach_servo(joint).into(),
            Command::Detach(joint) => self.detach_servo(joint).into(),
            Command::AttachAll => self.attach_all().into(),
            Command::DetachAll => self.detach_all().into(),
        }
    }
}
