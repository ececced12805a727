//! Armlet - Desktop Arm Controller Firmware
//!
//! Main firmware binary for RP2040-based four-servo arm controllers.
//! Brings up the board, loads the feedback calibration from EEPROM and
//! hands the arm to the control task.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, Config as AdcConfig};
use embassy_rp::gpio::{Level, Output, Pull};
use embassy_rp::pwm::Pwm;
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use armlet_core::calibration::CalibrationStore;
use armlet_core::config::{ArmConfig, HardwareVariant};
use armlet_core::executor::Arm;
use armlet_core::traits::ArmHardware;
use armlet_drivers::eeprom::{At24Store, TwoWireMaster};
use armlet_hal::TwoWireConfig;
use armlet_hal_rp2040::adc::FeedbackAdc;
use armlet_hal_rp2040::gpio::OpenDrainLine;
use armlet_hal_rp2040::pwm::servo_config;

use crate::board::{split_slice, Board, FirmwareArm};

mod board;
mod channels;
mod tasks;

/// EEPROM addressing of the board this binary is built for
#[cfg(feature = "revised-hardware")]
const VARIANT: HardwareVariant = HardwareVariant::Revised;
#[cfg(not(feature = "revised-hardware"))]
const VARIANT: HardwareVariant = HardwareVariant::Legacy;

// The arm lives for the whole program; the control task owns it
static ARM: StaticCell<FirmwareArm> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Armlet firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = ArmConfig::for_variant(VARIANT);
    info!("Hardware variant: {}", VARIANT);

    // EEPROM on a bit-banged bus (GPIO4 clock, GPIO5 data)
    let bus = TwoWireMaster::new(
        OpenDrainLine::new(p.PIN_4),
        OpenDrainLine::new(p.PIN_5),
        Delay,
        TwoWireConfig::STANDARD,
    );
    let eeprom = At24Store::new(bus, config.store.capacity, config.store.page_size);
    let store = CalibrationStore::new(eeprom, config.store);

    // Servo PWM: slice 0 carries rotation and left, slice 1 right and hand
    let (rotation, left) = split_slice(Pwm::new_output_ab(
        p.PWM_SLICE0,
        p.PIN_16,
        p.PIN_17,
        servo_config(),
    ));
    let (right, hand) = split_slice(Pwm::new_output_ab(
        p.PWM_SLICE1,
        p.PIN_18,
        p.PIN_19,
        servo_config(),
    ));

    // Servo feedback pots on ADC0-3
    let adc = Adc::new_blocking(p.ADC, AdcConfig::default());
    let channels = [
        Channel::new_pin(p.PIN_26, Pull::None),
        Channel::new_pin(p.PIN_27, Pull::None),
        Channel::new_pin(p.PIN_28, Pull::None),
        Channel::new_pin(p.PIN_29, Pull::None),
    ];

    let board = Board::new(
        [rotation, left, right, hand],
        FeedbackAdc::new(adc, channels),
        Output::new(p.PIN_20, Level::Low),
        Output::new(p.PIN_21, Level::Low),
    );
    let mut arm = Arm::new(board, store, config.motion);

    for (joint, outcome) in arm.load_calibration() {
        match outcome {
            Ok(()) => info!("{} calibration loaded: {}", joint, arm.store().record(joint)),
            Err(e) => warn!("{} calibration unavailable ({}), using default", joint, e),
        }
    }

    // Start from wherever the arm was left, then take hold of it there
    match arm.sync_from_feedback() {
        Ok(angles) => info!("Starting pose: {}", angles),
        Err(e) => warn!("Feedback unavailable ({}), assuming home", e),
    }
    let angles = arm.state().angles;
    if let Err(e) = arm.hardware_mut().write_angles(&angles) {
        warn!("Initial servo write failed: {}", e);
    }
    if let Err(e) = arm.hardware_mut().set_attached(true) {
        warn!("Servo attach failed: {}", e);
    }

    let arm = ARM.init(arm);
    spawner.spawn(tasks::control_task(arm)).unwrap();

    info!("All tasks spawned, firmware running");
}
