//! Servo output drivers
//!
//! Hobby servos are positioned by the width of a pulse repeated every
//! 20 ms. [`PwmServo`] turns an angle into a duty cycle on any
//! `embedded-hal` PWM channel.

pub mod pwm;

pub use pwm::{PwmServo, ServoConfig};
