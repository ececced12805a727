//! Simulated 24Cxx EEPROM sitting on two GPIO lines
//!
//! The device watches every edge the master makes, the way the real part
//! does: start and stop conditions, bits sampled on the rising clock,
//! its own output changed on the falling clock.

use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use armlet_hal::{InputLine, OutputLine};
use embedded_hal::delay::DelayNs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Waiting for a start condition
    Idle,
    /// Shifting in a byte from the master
    Receive { bits: u8, byte: u8 },
    /// Holding the acknowledge low for one clock
    Ack,
    /// Shifting out `byte`, `bit` currently on the line
    Transmit { bit: u8, byte: u8 },
    /// Waiting for the master to acknowledge a byte
    MasterAck { acked: bool },
}

#[derive(Debug)]
struct Device {
    address: u8,
    memory: Vec<u8>,
    page_size: usize,
    phase: Phase,
    /// Bytes received since the start condition
    index: usize,
    reading: bool,
    pointer: usize,
    pending: Vec<(usize, u8)>,
    /// Address polls still to refuse while a write cycle runs
    busy: u32,
    busy_polls: u32,
    /// Data byte of the next write to refuse
    nack_data: Option<usize>,
    holds_sda_low: bool,
    starts: u32,
    commits: u32,
}

impl Device {
    fn on_start(&mut self) {
        self.starts += 1;
        self.phase = Phase::Receive { bits: 0, byte: 0 };
        self.index = 0;
        self.holds_sda_low = false;
    }

    fn on_stop(&mut self) {
        self.phase = Phase::Idle;
        self.holds_sda_low = false;
        if !self.pending.is_empty() {
            for (addr, byte) in self.pending.drain(..) {
                self.memory[addr] = byte;
            }
            self.commits += 1;
            self.busy = self.busy_polls;
        }
    }

    fn on_rising(&mut self, sda: bool) {
        match self.phase {
            Phase::Receive { bits, byte } if bits < 8 => {
                self.phase = Phase::Receive {
                    bits: bits + 1,
                    byte: (byte << 1) | u8::from(sda),
                };
            }
            Phase::MasterAck { .. } => self.phase = Phase::MasterAck { acked: !sda },
            _ => {}
        }
    }

    fn on_falling(&mut self) {
        match self.phase {
            Phase::Receive { bits: 8, byte } => {
                if self.accept(byte) {
                    self.holds_sda_low = true;
                    self.phase = Phase::Ack;
                } else {
                    self.phase = Phase::Idle;
                }
            }
            Phase::Ack => {
                self.holds_sda_low = false;
                if self.reading {
                    self.load_next();
                } else {
                    self.phase = Phase::Receive { bits: 0, byte: 0 };
                }
            }
            Phase::Transmit { bit, byte } => {
                if bit == 7 {
                    self.holds_sda_low = false;
                    self.phase = Phase::MasterAck { acked: false };
                } else {
                    self.phase = Phase::Transmit { bit: bit + 1, byte };
                    self.holds_sda_low = byte & (0x80 >> (bit + 1)) == 0;
                }
            }
            Phase::MasterAck { acked: true } => self.load_next(),
            Phase::MasterAck { acked: false } => self.phase = Phase::Idle,
            _ => {}
        }
    }

    fn load_next(&mut self) {
        let byte = self.memory[self.pointer];
        self.pointer = (self.pointer + 1) % self.memory.len();
        self.phase = Phase::Transmit { bit: 0, byte };
        self.holds_sda_low = byte & 0x80 == 0;
    }

    /// Handle a complete byte; returns whether to acknowledge it
    fn accept(&mut self, byte: u8) -> bool {
        let index = self.index;
        self.index += 1;
        match index {
            0 => {
                if byte & 0xFE != self.address {
                    return false;
                }
                if self.busy > 0 {
                    self.busy -= 1;
                    return false;
                }
                self.reading = byte & 1 == 1;
                true
            }
            1 => {
                self.pointer = (usize::from(byte) << 8) % self.memory.len();
                true
            }
            2 => {
                self.pointer = (self.pointer | usize::from(byte)) % self.memory.len();
                true
            }
            _ => {
                if self.nack_data == Some(index - 3) {
                    self.nack_data = None;
                    return false;
                }
                // The page latch wraps within the page, like the real part
                let page = self.pointer - self.pointer % self.page_size;
                let offset = (self.pointer + index - 3) % self.page_size;
                self.pending.push((page + offset, byte));
                true
            }
        }
    }
}

#[derive(Debug)]
struct Wire {
    scl_released: bool,
    sda_released: bool,
    device: Device,
}

impl Wire {
    fn scl(&self) -> bool {
        self.scl_released
    }

    fn sda(&self) -> bool {
        self.sda_released && !self.device.holds_sda_low
    }

    fn set(&mut self, line: Line, released: bool) {
        let (scl, sda) = (self.scl(), self.sda());
        match line {
            Line::Scl => self.scl_released = released,
            Line::Sda => self.sda_released = released,
        }
        let (new_scl, new_sda) = (self.scl(), self.sda());

        if scl && new_scl && sda != new_sda {
            if new_sda {
                self.device.on_stop();
            } else {
                self.device.on_start();
            }
        } else if !scl && new_scl {
            self.device.on_rising(new_sda);
        } else if scl && !new_scl {
            self.device.on_falling();
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Line {
    Scl,
    Sda,
}

/// One of the two bus lines as seen by the master
#[derive(Debug, Clone)]
pub struct SimLine {
    wire: Rc<RefCell<Wire>>,
    line: Line,
}

impl OutputLine for SimLine {
    fn release(&mut self) {
        self.wire.borrow_mut().set(self.line, true);
    }

    fn drive_low(&mut self) {
        self.wire.borrow_mut().set(self.line, false);
    }
}

impl InputLine for SimLine {
    fn is_high(&mut self) -> bool {
        let wire = self.wire.borrow();
        match self.line {
            Line::Scl => wire.scl(),
            Line::Sda => wire.sda(),
        }
    }
}

/// Handle on the simulated bus and the device on it
#[derive(Debug, Clone)]
pub struct SimBus {
    wire: Rc<RefCell<Wire>>,
}

impl SimBus {
    /// Erased device answering at `address` with a 64-byte page
    pub fn new(address: u8, capacity: usize) -> Self {
        let device = Device {
            address,
            memory: vec![0xFF; capacity],
            page_size: 64,
            phase: Phase::Idle,
            index: 0,
            reading: false,
            pointer: 0,
            pending: Vec::new(),
            busy: 0,
            busy_polls: 0,
            nack_data: None,
            holds_sda_low: false,
            starts: 0,
            commits: 0,
        };
        Self {
            wire: Rc::new(RefCell::new(Wire {
                scl_released: true,
                sda_released: true,
                device,
            })),
        }
    }

    pub fn scl(&self) -> SimLine {
        SimLine {
            wire: self.wire.clone(),
            line: Line::Scl,
        }
    }

    pub fn sda(&self) -> SimLine {
        SimLine {
            wire: self.wire.clone(),
            line: Line::Sda,
        }
    }

    /// Address polls the device refuses after each committed write
    pub fn set_write_cycle(&self, polls: u32) {
        self.wire.borrow_mut().device.busy_polls = polls;
    }

    /// Refuse data byte `index` of the next write, once
    pub fn nack_data_once(&self, index: usize) {
        self.wire.borrow_mut().device.nack_data = Some(index);
    }

    /// Preload memory without going through the bus
    pub fn load(&self, offset: usize, bytes: &[u8]) {
        let mut wire = self.wire.borrow_mut();
        wire.device.memory[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    pub fn contents(&self, offset: usize, len: usize) -> Vec<u8> {
        self.wire.borrow().device.memory[offset..offset + len].to_vec()
    }

    /// Start conditions seen so far
    pub fn starts(&self) -> u32 {
        self.wire.borrow().device.starts
    }

    /// Write cycles the device has run
    pub fn commits(&self) -> u32 {
        self.wire.borrow().device.commits
    }
}

/// Delay that only adds up what it was asked to wait
#[derive(Debug, Clone, Copy, Default)]
pub struct CountingDelay {
    pub total_ns: u64,
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}
