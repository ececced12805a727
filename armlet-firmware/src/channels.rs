//! Inter-task communication channels
//!
//! The command dispatcher (serial or Bluetooth front end) pushes typed
//! commands into `COMMANDS` and collects one reply per command from
//! `REPLIES`. The control task drains both without blocking.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use armlet_core::command::{Command, Reply};

/// Channel capacity for pending commands
const COMMAND_CHANNEL_SIZE: usize = 4;

/// Channel capacity for unread replies
const REPLY_CHANNEL_SIZE: usize = 4;

/// Commands waiting for the next control tick
pub static COMMANDS: Channel<CriticalSectionRawMutex, Command, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Replies, in command order
pub static REPLIES: Channel<CriticalSectionRawMutex, Reply, REPLY_CHANNEL_SIZE> = Channel::new();
