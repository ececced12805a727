//! Board wiring
//!
//! Pin assignment (Armlet controller board):
//! - Servo PWM: GPIO16 rotation, GPIO17 left, GPIO18 right, GPIO19 hand
//! - Servo feedback: GPIO26-29 (ADC0-3), same joint order
//! - Gripper: GPIO20, pump: GPIO21
//! - EEPROM bus: GPIO4 clock, GPIO5 data (bit-banged, external pull-ups)

use armlet_core::executor::Arm;
use armlet_core::motion::Joint;
use armlet_core::traits::{ArmHardware, Effector, HardwareError, ServoDriver};
use armlet_drivers::eeprom::At24Store;
use armlet_drivers::servo::{PwmServo, ServoConfig};
use armlet_hal_rp2040::adc::FeedbackAdc;
use armlet_hal_rp2040::gpio::OpenDrainLine;
use embassy_rp::gpio::Output;
use embassy_rp::pwm::{Pwm, PwmOutput};
use embassy_time::Delay;

/// EEPROM on the bit-banged bus
pub type Eeprom = At24Store<OpenDrainLine, OpenDrainLine, Delay>;

pub type Servo = PwmServo<PwmOutput<'static>>;

/// The arm as wired on this board
pub type FirmwareArm = Arm<Eeprom, Board>;

/// Split a PWM slice into its two servo outputs
pub fn split_slice(pwm: Pwm<'static>) -> (Servo, Servo) {
    match pwm.split() {
        (Some(a), Some(b)) => (
            PwmServo::new(a, ServoConfig::default()),
            PwmServo::new(b, ServoConfig::default()),
        ),
        _ => defmt::panic!("PWM slice without both outputs"),
    }
}

/// Servos, feedback and effector outputs
pub struct Board {
    servos: [Servo; 4],
    feedback: FeedbackAdc,
    gripper: Output<'static>,
    pump: Output<'static>,
}

impl Board {
    /// `servos` in joint order: rotation, left, right, hand
    pub fn new(
        servos: [Servo; 4],
        feedback: FeedbackAdc,
        gripper: Output<'static>,
        pump: Output<'static>,
    ) -> Self {
        Self {
            servos,
            feedback,
            gripper,
            pump,
        }
    }
}

impl Effector for Board {
    fn set_gripper(&mut self, catch: bool) {
        if catch {
            self.gripper.set_high();
        } else {
            self.gripper.set_low();
        }
    }

    fn set_pump(&mut self, on: bool) {
        if on {
            self.pump.set_high();
        } else {
            self.pump.set_low();
        }
    }
}

impl ArmHardware for Board {
    fn write_servo(&mut self, joint: Joint, angle: f32) -> Result<(), HardwareError> {
        self.servos[joint.index()].set_angle(angle)
    }

    fn set_servo_attached(&mut self, joint: Joint, attached: bool) -> Result<(), HardwareError> {
        self.servos[joint.index()].set_attached(attached)
    }

    fn read_feedback(&mut self, joint: Joint) -> Result<u16, HardwareError> {
        self.feedback.read(joint)
    }
}
