//! Open-drain line abstractions
//!
//! The two-wire bus is wired-AND: a line is either actively pulled low
//! or released and left to the pull-up resistor. Nothing ever drives a
//! line high, so a device stretching or acknowledging can always win.

/// A line the master can pull low or release
pub trait OutputLine {
    /// Stop driving the line; the pull-up takes it high unless a
    /// device holds it low
    fn release(&mut self);

    /// Actively pull the line low
    fn drive_low(&mut self);

    /// Release for `true`, drive low for `false`
    fn set_level(&mut self, high: bool) {
        if high {
            self.release();
        } else {
            self.drive_low();
        }
    }
}

/// A line whose electrical level can be sampled
pub trait InputLine {
    /// Sample the line level
    fn is_high(&mut self) -> bool;

    /// Sample the line level
    fn is_low(&mut self) -> bool {
        !self.is_high()
    }
}

/// Line that is both driven and sampled, such as the data line
pub trait BidirectionalLine: OutputLine + InputLine {}

impl<T: OutputLine + InputLine> BidirectionalLine for T {}
