//! RP2040-specific HAL for the arm firmware
//!
//! This crate provides RP2040 implementations of the shared
//! `armlet-hal` traits, plus the board plumbing the firmware needs:
//!
//! - Open-drain GPIO lines for the bit-banged EEPROM bus
//! - ADC channel map and feedback sampling for the servo pots
//! - PWM slice setup for 50 Hz servo pulses

#![no_std]

pub mod adc;
pub mod gpio;
pub mod pwm;

// Re-export shared traits from armlet-hal for convenience
pub use armlet_hal::{InputLine, OutputLine};
