//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in armlet-hal and armlet-core:
//!
//! - EEPROM storage (bit-banged two-wire master, 24Cxx `ByteStore`)
//! - Servo outputs (PWM pulse-width positioning)

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod eeprom;
pub mod servo;
