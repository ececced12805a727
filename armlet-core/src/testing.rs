//! Test doubles for the byte store and the arm hardware

use std::vec::Vec;

use armlet_hal::{ByteStore, DeviceAddress, StoreError};

use crate::config::DEFAULT_STORE_CAPACITY;
use crate::motion::{Joint, JointAngles};
use crate::traits::{ArmHardware, Effector, HardwareError};

/// RAM-backed EEPROM pair with fault injection
#[derive(Debug, Clone)]
pub struct MemStore {
    banks: Vec<(u8, Vec<u8>)>,
    capacity: usize,
    fail_reads: bool,
    fail_writes: bool,
    writes: usize,
}

impl MemStore {
    /// Erased devices of the stock size
    pub fn new() -> Self {
        Self {
            banks: Vec::new(),
            capacity: DEFAULT_STORE_CAPACITY as usize,
            fail_reads: false,
            fail_writes: false,
            writes: 0,
        }
    }

    pub fn fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of successful block writes
    pub fn writes(&self) -> usize {
        self.writes
    }

    fn bank(&mut self, device: DeviceAddress) -> &mut Vec<u8> {
        let key = device.write_byte();
        let idx = match self.banks.iter().position(|(k, _)| *k == key) {
            Some(idx) => idx,
            None => {
                self.banks.push((key, vec![0xFF; self.capacity]));
                self.banks.len() - 1
            }
        };
        &mut self.banks[idx].1
    }

    fn check(&self, offset: u16, len: usize) -> Result<usize, StoreError> {
        let start = usize::from(offset);
        if start + len > self.capacity {
            return Err(StoreError::OutOfBounds);
        }
        Ok(start)
    }
}

impl ByteStore for MemStore {
    fn write_block(
        &mut self,
        device: DeviceAddress,
        offset: u16,
        data: &[u8],
    ) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::NoAcknowledge);
        }
        let start = self.check(offset, data.len())?;
        self.bank(device)[start..start + data.len()].copy_from_slice(data);
        self.writes += 1;
        Ok(())
    }

    fn read_block(
        &mut self,
        device: DeviceAddress,
        offset: u16,
        buf: &mut [u8],
    ) -> Result<(), StoreError> {
        if self.fail_reads {
            return Err(StoreError::NoAcknowledge);
        }
        let start = self.check(offset, buf.len())?;
        let len = buf.len();
        buf.copy_from_slice(&self.bank(device)[start..start + len]);
        Ok(())
    }
}

/// Arm hardware that records every call
#[derive(Debug, Clone, Default)]
pub struct MockHardware {
    /// Servo writes in order
    pub writes: Vec<(Joint, f32)>,
    /// Attach state per joint, indexed by servo number
    pub attached: [bool; 4],
    /// Raw feedback per joint, indexed by servo number
    pub feedback: [u16; 4],
    pub gripper: bool,
    pub pump: bool,
    pub fail_writes: bool,
    /// Reject attach requests (detach still works)
    pub fail_attach: bool,
    /// Reject detach requests
    pub fail_detach: bool,
}

impl MockHardware {
    pub fn new() -> Self {
        Self {
            attached: [true; 4],
            feedback: [300; 4],
            ..Self::default()
        }
    }

    /// Servo writes regrouped into whole poses
    pub fn poses(&self) -> Vec<JointAngles> {
        self.writes
            .chunks_exact(4)
            .map(|chunk| {
                let mut angles = JointAngles::default();
                for (joint, angle) in chunk {
                    angles.set(*joint, *angle);
                }
                angles
            })
            .collect()
    }

    pub fn all_attached(&self) -> bool {
        self.attached.iter().all(|a| *a)
    }

    pub fn all_detached(&self) -> bool {
        self.attached.iter().all(|a| !*a)
    }

    /// Set the feedback reading for every joint
    pub fn set_feedback(&mut self, raw: [u16; 4]) {
        self.feedback = raw;
    }
}

impl Effector for MockHardware {
    fn set_gripper(&mut self, catch: bool) {
        self.gripper = catch;
    }

    fn set_pump(&mut self, on: bool) {
        self.pump = on;
    }
}

impl ArmHardware for MockHardware {
    fn write_servo(&mut self, joint: Joint, angle: f32) -> Result<(), HardwareError> {
        if self.fail_writes {
            return Err(HardwareError::Output);
        }
        self.writes.push((joint, angle));
        Ok(())
    }

    fn set_servo_attached(&mut self, joint: Joint, attached: bool) -> Result<(), HardwareError> {
        if (attached && self.fail_attach) || (!attached && self.fail_detach) {
            return Err(HardwareError::Output);
        }
        self.attached[joint.index()] = attached;
        Ok(())
    }

    fn read_feedback(&mut self, joint: Joint) -> Result<u16, HardwareError> {
        Ok(self.feedback[joint.index()])
    }
}
