//! External EEPROM support
//!
//! The EEPROM hangs off two plain GPIO lines. [`TwoWireMaster`] clocks
//! the protocol by hand and [`At24Store`] layers the 24Cxx memory
//! commands on top, presenting the chip as a [`ByteStore`].
//!
//! [`ByteStore`]: armlet_hal::ByteStore

pub mod at24;
pub mod bus;

#[cfg(test)]
mod sim;

pub use at24::At24Store;
pub use bus::{BusError, TwoWireMaster};
