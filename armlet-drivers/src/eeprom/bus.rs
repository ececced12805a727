//! Bit-banged two-wire master
//!
//! Every transition is timed by an `embedded-hal` delay of half a clock
//! period, taken from [`TwoWireConfig`]. Moving one byte costs nine
//! clocks (eight data bits and the acknowledge), so about 90 µs at the
//! default 100 kHz, plus one half period for every poll spent waiting on
//! a slow acknowledge. Polls are capped at `ack_poll_limit`, so no call
//! here can hang on a missing device.

use armlet_hal::{BidirectionalLine, OutputLine, StoreError, TwoWireConfig};
use embedded_hal::delay::DelayNs;

/// Errors on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// Acknowledge bit never arrived within the poll budget
    NoAcknowledge,
}

impl From<BusError> for StoreError {
    fn from(e: BusError) -> Self {
        match e {
            BusError::NoAcknowledge => StoreError::NoAcknowledge,
        }
    }
}

/// Two-wire bus master over an open-drain clock and data line
pub struct TwoWireMaster<SCL, SDA, D> {
    scl: SCL,
    sda: SDA,
    delay: D,
    config: TwoWireConfig,
}

impl<SCL, SDA, D> TwoWireMaster<SCL, SDA, D>
where
    SCL: OutputLine,
    SDA: BidirectionalLine,
    D: DelayNs,
{
    /// Take the lines and leave the bus idle (both released)
    pub fn new(mut scl: SCL, mut sda: SDA, delay: D, config: TwoWireConfig) -> Self {
        sda.release();
        scl.release();
        Self {
            scl,
            sda,
            delay,
            config,
        }
    }

    pub fn config(&self) -> &TwoWireConfig {
        &self.config
    }

    /// Give the lines back
    pub fn release(self) -> (SCL, SDA, D) {
        (self.scl, self.sda, self.delay)
    }

    fn half(&mut self) {
        let ns = self.config.half_period_ns();
        self.delay.delay_ns(ns);
    }

    /// Start condition: data falls while the clock is high
    ///
    /// Also serves as a repeated start in the middle of a transfer.
    pub fn start(&mut self) {
        self.sda.release();
        self.half();
        self.scl.release();
        self.half();
        self.sda.drive_low();
        self.half();
        self.scl.drive_low();
        self.half();
    }

    /// Stop condition: data rises while the clock is high
    pub fn stop(&mut self) {
        self.sda.drive_low();
        self.half();
        self.scl.release();
        self.half();
        self.sda.release();
        self.half();
    }

    fn write_bit(&mut self, bit: bool) {
        self.sda.set_level(bit);
        self.half();
        self.scl.release();
        self.half();
        self.scl.drive_low();
    }

    fn read_bit(&mut self) -> bool {
        self.sda.release();
        self.half();
        self.scl.release();
        self.half();
        let bit = self.sda.is_high();
        self.scl.drive_low();
        bit
    }

    /// Clock out one byte, MSB first, and wait for the acknowledge
    pub fn write_byte(&mut self, byte: u8) -> Result<(), BusError> {
        for i in (0..8).rev() {
            self.write_bit(byte & (1 << i) != 0);
        }

        self.sda.release();
        self.half();
        self.scl.release();

        let mut polls = 0u8;
        while self.sda.is_high() {
            if polls >= self.config.ack_poll_limit {
                self.scl.drive_low();
                return Err(BusError::NoAcknowledge);
            }
            polls += 1;
            self.half();
        }

        self.half();
        self.scl.drive_low();
        Ok(())
    }

    /// Clock in one byte, MSB first
    ///
    /// `ack` asks the device for another byte; the last byte of a read
    /// is answered with a not-acknowledge instead.
    pub fn read_byte(&mut self, ack: bool) -> u8 {
        let mut byte = 0u8;
        for _ in 0..8 {
            byte = (byte << 1) | u8::from(self.read_bit());
        }
        self.write_bit(!ack);
        self.sda.release();
        byte
    }
}
