//! Open-drain bus lines
//!
//! The EEPROM bus needs pins that can only pull low. Embassy's
//! `OutputOpenDrain` does exactly that and still reads the pad back,
//! so one wrapper serves both the clock and the data line. The board
//! provides the pull-up resistors.

use armlet_hal::{InputLine, OutputLine};
use embassy_rp::gpio::{Level, OutputOpenDrain, Pin};
use embassy_rp::Peri;

/// GPIO pin used as an open-drain bus line
pub struct OpenDrainLine {
    pin: OutputOpenDrain<'static>,
}

impl OpenDrainLine {
    /// Take `pin` and leave it released
    pub fn new(pin: Peri<'static, impl Pin>) -> Self {
        Self {
            pin: OutputOpenDrain::new(pin, Level::High),
        }
    }
}

impl OutputLine for OpenDrainLine {
    fn release(&mut self) {
        self.pin.set_high();
    }

    fn drive_low(&mut self) {
        self.pin.set_low();
    }
}

impl InputLine for OpenDrainLine {
    fn is_high(&mut self) -> bool {
        self.pin.is_high()
    }
}
