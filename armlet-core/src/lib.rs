//! Board-agnostic core logic for the arm controller firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Geometric model (forward/inverse kinematics, feedback conversion)
//! - Trajectory planning with easing profiles
//! - Mode state machine (live, learning, playback)
//! - Calibration store and recorded-motion log
//! - Motion executor and the command surface it exposes
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod calibration;
pub mod command;
pub mod config;
pub mod executor;
pub mod motion;
pub mod state;
pub mod traits;

#[cfg(test)]
mod testing;
