//! Two-wire bus timing
//!
//! The bus is bit-banged on plain GPIO, so its clock is nothing more
//! than the delay between line transitions. This module owns that
//! number and the bounded retry budget that keeps a dead device from
//! stalling the control loop.

/// Timing and retry budget for the bit-banged two-wire master
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TwoWireConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Clock-high polls spent waiting for an acknowledge bit
    pub ack_poll_limit: u8,
    /// Attempts per block transfer before reporting failure
    pub retries: u8,
    /// Address polls spent waiting out an EEPROM write cycle
    pub write_cycle_polls: u16,
}

impl Default for TwoWireConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl TwoWireConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self {
        frequency: 100_000,
        ack_poll_limit: 255,
        retries: 3,
        write_cycle_polls: 100,
    };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self {
        frequency: 400_000,
        ..Self::STANDARD
    };

    /// Half of one clock period in nanoseconds
    ///
    /// Each clock phase (low, high) is held for this long.
    pub const fn half_period_ns(&self) -> u32 {
        500_000_000 / self.frequency
    }

    /// Worst-case time to move one byte, in microseconds
    ///
    /// Eight data clocks plus one acknowledge clock. When the device is
    /// slow to acknowledge, every extra poll costs another half period.
    pub const fn byte_time_us(&self) -> u32 {
        let clocks_ns = 9 * 2 * self.half_period_ns();
        let ack_wait_ns = self.ack_poll_limit as u32 * self.half_period_ns();
        (clocks_ns + ack_wait_ns).div_ceil(1000)
    }
}
