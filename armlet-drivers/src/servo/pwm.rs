//! Pulse-width servo on a PWM channel

use armlet_core::traits::{HardwareError, ServoDriver};
use embedded_hal::pwm::SetDutyCycle;

/// Pulse timing of a servo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServoConfig {
    /// Pulse width at 0 degrees
    pub min_pulse_us: u16,
    /// Pulse width at `max_angle`
    pub max_pulse_us: u16,
    /// Repetition period of the pulse
    pub period_us: u16,
    /// Travel of the servo in degrees
    pub max_angle: u8,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            min_pulse_us: 500,
            max_pulse_us: 2500,
            period_us: 20_000,
            max_angle: 180,
        }
    }
}

impl ServoConfig {
    /// Pulse width for `angle`, clamped to the servo's travel
    pub fn pulse_us(&self, angle: f32) -> u16 {
        let max = f32::from(self.max_angle);
        let angle = if angle.is_nan() { 0.0 } else { angle.clamp(0.0, max) };
        let span = f32::from(self.max_pulse_us - self.min_pulse_us);
        self.min_pulse_us + (span * angle / max + 0.5) as u16
    }
}

/// One servo driven by a PWM output
///
/// Detaching drops the duty cycle to zero, so the servo gets no pulses
/// and can be back-driven by hand.
pub struct PwmServo<P> {
    pwm: P,
    config: ServoConfig,
    angle: f32,
    attached: bool,
}

impl<P: SetDutyCycle> PwmServo<P> {
    /// Servo starting detached at mid travel
    pub fn new(pwm: P, config: ServoConfig) -> Self {
        Self {
            pwm,
            config,
            angle: f32::from(config.max_angle) / 2.0,
            attached: false,
        }
    }

    /// Last commanded angle
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn config(&self) -> &ServoConfig {
        &self.config
    }

    fn drive(&mut self) -> Result<(), HardwareError> {
        let pulse = self.config.pulse_us(self.angle);
        self.pwm
            .set_duty_cycle_fraction(pulse, self.config.period_us)
            .map_err(|_| HardwareError::Output)
    }
}

impl<P: SetDutyCycle> ServoDriver for PwmServo<P> {
    fn set_angle(&mut self, angle: f32) -> Result<(), HardwareError> {
        self.angle = angle.clamp(0.0, f32::from(self.config.max_angle));
        if self.attached {
            self.drive()?;
        }
        Ok(())
    }

    fn set_attached(&mut self, attached: bool) -> Result<(), HardwareError> {
        self.attached = attached;
        if attached {
            self.drive()
        } else {
            self.pwm
                .set_duty_cycle_fully_off()
                .map_err(|_| HardwareError::Output)
        }
    }

    fn is_attached(&self) -> bool {
        self.attached
    }
}
