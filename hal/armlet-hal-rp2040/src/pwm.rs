//! PWM slice setup for servo pulses
//!
//! With the system clock at 125 MHz a divider of 125 gives one counter
//! tick per microsecond, and a wrap at 19 999 gives the 20 ms servo
//! frame. Duty cycles then read directly as pulse widths in µs.

use embassy_rp::pwm::Config;
use fixed::FixedU16;
use fixed::types::extra::U4;

/// Counter ticks per microsecond at the default clock
pub const SYS_CLOCK_MHZ: u8 = 125;

/// Servo frame length
pub const FRAME_US: u16 = 20_000;

/// Slice configuration for a 50 Hz, 1 µs resolution servo frame
///
/// Both outputs start with a zero duty cycle, so attached servos stay
/// limp until the first angle is written.
pub fn servo_config() -> Config {
    let mut config = Config::default();
    config.divider = FixedU16::<U4>::from_num(SYS_CLOCK_MHZ);
    config.top = FRAME_US - 1;
    config.compare_a = 0;
    config.compare_b = 0;
    config
}
