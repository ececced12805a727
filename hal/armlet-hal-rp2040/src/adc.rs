//! Servo feedback over the ADC
//!
//! RP2040 has a single ADC with 4 external channels, one per servo:
//! - ADC0: GPIO26, base rotation
//! - ADC1: GPIO27, left link
//! - ADC2: GPIO28, right link
//! - ADC3: GPIO29, hand
//!
//! The servo pots are read at 12 bits and scaled down to the 10-bit
//! counts the calibration coefficients are fitted against.

use armlet_core::motion::Joint;
use armlet_core::traits::HardwareError;
use embassy_rp::adc::{Adc, Blocking, Channel};

/// ADC channel identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcChannel {
    /// ADC0 on GPIO26
    Adc0,
    /// ADC1 on GPIO27
    Adc1,
    /// ADC2 on GPIO28
    Adc2,
    /// ADC3 on GPIO29
    Adc3,
}

impl AdcChannel {
    /// Get the GPIO pin for this ADC channel
    pub fn gpio(&self) -> u8 {
        match self {
            AdcChannel::Adc0 => 26,
            AdcChannel::Adc1 => 27,
            AdcChannel::Adc2 => 28,
            AdcChannel::Adc3 => 29,
        }
    }

    /// Channel wired to a servo's feedback pot
    pub fn for_joint(joint: Joint) -> Self {
        match joint {
            Joint::Rotation => AdcChannel::Adc0,
            Joint::Left => AdcChannel::Adc1,
            Joint::Right => AdcChannel::Adc2,
            Joint::Hand => AdcChannel::Adc3,
        }
    }
}

/// Reduce a 12-bit conversion to the 10-bit feedback scale
pub fn to_feedback_count(raw: u16) -> u16 {
    (raw & 0x0FFF) >> 2
}

/// The ADC and one channel per servo
pub struct FeedbackAdc {
    adc: Adc<'static, Blocking>,
    channels: [Channel<'static>; 4],
}

impl FeedbackAdc {
    /// `channels` in joint order: rotation, left, right, hand
    pub fn new(adc: Adc<'static, Blocking>, channels: [Channel<'static>; 4]) -> Self {
        Self { adc, channels }
    }

    /// One blocking conversion of a servo's feedback pot
    pub fn read(&mut self, joint: Joint) -> Result<u16, HardwareError> {
        let channel = &mut self.channels[joint.index()];
        self.adc
            .blocking_read(channel)
            .map(to_feedback_count)
            .map_err(|_| HardwareError::Conversion)
    }
}
