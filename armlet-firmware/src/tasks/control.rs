//! Control loop task
//!
//! Runs at the trajectory sample interval. Each tick it:
//! - executes every command waiting in the channel,
//! - advances the mode state machine and at most one trajectory sample.
//!
//! Nothing in here awaits anything but the ticker, so a burst of
//! commands can never stall motion already in flight.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use armlet_core::command::{Command, Reply};
use armlet_core::executor::ArmEvent;

use crate::board::FirmwareArm;
use crate::channels::{COMMANDS, REPLIES};

#[embassy_executor::task]
pub async fn control_task(arm: &'static mut FirmwareArm) {
    info!("Control task started in {}", arm.mode());

    let interval = u64::from(arm.config().sample_interval_ms);
    let mut ticker = Ticker::every(Duration::from_millis(interval));
    let start = Instant::now();

    loop {
        ticker.next().await;
        let now_ms = start.elapsed().as_millis();

        while let Ok(command) = COMMANDS.try_receive() {
            let reply = arm.execute(command, now_ms);
            log_reply(&command, &reply);
            if REPLIES.try_send(reply).is_err() {
                warn!("Reply queue full, dropped {}", reply);
            }
        }

        match arm.tick(now_ms) {
            Some(ArmEvent::MoveComplete) => debug!("Move complete at {}", arm.current_pose()),
            Some(ArmEvent::ModeChanged(mode)) => debug!("Mode -> {}", mode),
            Some(ArmEvent::HardwareFault(e)) => warn!("Servo fault: {}", e),
            Some(ArmEvent::StoreFault(e)) => warn!("EEPROM fault: {}", e),
            None => {}
        }
    }
}

fn log_reply(command: &Command, reply: &Reply) {
    match reply {
        Reply::Move(status) => debug!("Move {}: {}", command, status),
        Reply::Mode(mode) => debug!("Mode {}", mode),
        Reply::ModeRejected(e) => warn!("Mode change rejected: {}", e),
        Reply::Calibration(Err(e)) => warn!("Calibration not stored: {}", e),
        Reply::Hardware(e) => warn!("{} failed: {}", command, e),
        Reply::Busy(mode) => warn!("{} refused in {}", command, mode),
        _ => trace!("{} -> {}", command, reply),
    }
}
