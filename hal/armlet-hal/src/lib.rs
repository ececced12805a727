//! Armlet Hardware Abstraction Layer
//!
//! This crate defines the hardware seams shared by the board-agnostic
//! core, the drivers, and chip-specific HALs. The core never touches a
//! register; it talks to persistent memory through [`store::ByteStore`],
//! and the EEPROM driver talks to the wire through [`gpio`] line traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  armlet-core (calibration, recording)   │
//! └─────────────────────────────────────────┘
//!                     │  ByteStore
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  armlet-drivers (bit-banged EEPROM)     │
//! └─────────────────────────────────────────┘
//!                     │  OutputLine / InputLine
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  armlet-hal-rp2040 (open-drain GPIO)    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputLine`], [`gpio::InputLine`] - Open-drain bus lines
//! - [`store::ByteStore`] - Byte-addressable persistent memory
//!
//! [`bus::TwoWireConfig`] carries the clock and retry budget for the
//! two-wire protocol.

#![no_std]
#![deny(unsafe_code)]

pub mod bus;
pub mod gpio;
pub mod store;

// Re-export key traits at crate root for convenience
pub use bus::TwoWireConfig;
pub use gpio::{BidirectionalLine, InputLine, OutputLine};
pub use store::{ByteStore, DeviceAddress, StoreError};
