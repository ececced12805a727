//! Configuration types
//!
//! Everything here is chosen once at startup and never changes while the
//! control loop runs. The hardware variant in particular is a build-time
//! decision made by the firmware; the core only consumes the value.

use armlet_hal::DeviceAddress;
use serde::{Deserialize, Serialize};

use crate::motion::Joint;

/// Size of the calibration region reserved for each feedback joint
pub const CALIBRATION_REGION_LEN: u16 = 0x02D0;

/// Bytes of each region actually occupied by the calibration block
pub const CALIBRATION_BLOCK_LEN: usize = 0x20;

/// Base of the left joint's calibration region
pub const LEFT_CALIBRATION_ADDR: u16 = 0x0000;

/// Base of the right joint's calibration region
pub const RIGHT_CALIBRATION_ADDR: u16 = LEFT_CALIBRATION_ADDR + CALIBRATION_REGION_LEN;

/// Base of the rotation joint's calibration region
pub const ROTATION_CALIBRATION_ADDR: u16 = RIGHT_CALIBRATION_ADDR + CALIBRATION_REGION_LEN;

/// First byte of the recording log, right after the last calibration region
pub const RECORDING_BASE_ADDR: u16 = ROTATION_CALIBRATION_ADDR + CALIBRATION_REGION_LEN;

/// Capacity of the stock 24C256 part
pub const DEFAULT_STORE_CAPACITY: u32 = 32 * 1024;

/// Write page of the stock 24C256 part
pub const DEFAULT_PAGE_SIZE: u16 = 64;

/// Board revision, which decides where the EEPROM answers on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HardwareVariant {
    /// Single EEPROM at 0xA0 holding everything
    #[default]
    Legacy,
    /// System EEPROM at 0xA2, user EEPROM at 0xA0
    Revised,
}

impl HardwareVariant {
    /// Device holding the calibration blocks
    pub const fn system_device(self) -> DeviceAddress {
        match self {
            HardwareVariant::Legacy => DeviceAddress(0xA0),
            HardwareVariant::Revised => DeviceAddress(0xA2),
        }
    }

    /// Device holding the recording log
    pub const fn user_device(self) -> DeviceAddress {
        DeviceAddress(0xA0)
    }
}

/// Persistent memory layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StoreLayout {
    /// Addressing scheme of the board
    pub variant: HardwareVariant,
    /// Size of each EEPROM in bytes
    pub capacity: u32,
    /// Largest write the part accepts without wrapping
    pub page_size: u16,
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self {
            variant: HardwareVariant::Legacy,
            capacity: DEFAULT_STORE_CAPACITY,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl StoreLayout {
    /// Layout for the given variant with the stock EEPROM size
    pub const fn for_variant(variant: HardwareVariant) -> Self {
        Self {
            variant,
            capacity: DEFAULT_STORE_CAPACITY,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Offset of a joint's calibration block, `None` for the hand servo
    /// which has no feedback calibration
    pub const fn calibration_offset(&self, joint: Joint) -> Option<u16> {
        match joint {
            Joint::Left => Some(LEFT_CALIBRATION_ADDR),
            Joint::Right => Some(RIGHT_CALIBRATION_ADDR),
            Joint::Rotation => Some(ROTATION_CALIBRATION_ADDR),
            Joint::Hand => None,
        }
    }

    /// First byte of the recording log
    pub const fn recording_start(&self) -> u16 {
        RECORDING_BASE_ADDR
    }

    /// One past the last usable byte of the recording log
    pub const fn recording_end(&self) -> u32 {
        self.capacity
    }
}

/// Timing of the control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionConfig {
    /// Spacing between trajectory samples (one control tick)
    pub sample_interval_ms: u32,
    /// Minimum spacing between captures while learning
    pub capture_interval_ms: u32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 20,
            capture_interval_ms: 50,
        }
    }
}

/// Complete startup configuration of the core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ArmConfig {
    /// Persistent memory layout
    pub store: StoreLayout,
    /// Control loop timing
    pub motion: MotionConfig,
}

impl ArmConfig {
    /// Default timing with the given board revision
    pub const fn for_variant(variant: HardwareVariant) -> Self {
        Self {
            store: StoreLayout::for_variant(variant),
            motion: MotionConfig {
                sample_interval_ms: 20,
                capture_interval_ms: 50,
            },
        }
    }
}
