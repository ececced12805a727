//! Mode definition and transition table

use armlet_hal::StoreError;
use serde::{Deserialize, Serialize};

use super::events::ModeEvent;
use crate::traits::HardwareError;

/// Operating modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Live control
    #[default]
    Normal,
    /// Live control with a host link up
    NormalConnected,
    /// Servos detached, capturing hand-guided motion
    Learning,
    /// Capture stopped, flushing the log
    LearningStop,
    /// Replaying the log once
    SinglePlay,
    /// Replaying the log repeatedly
    LoopPlay,
}

/// Why a mode change was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeError {
    /// No transition for this event in this mode
    InvalidTransition { from: Mode, event: ModeEvent },
    /// Playback requested but the log holds nothing
    EmptyRecording,
    /// Store access needed by the transition failed
    Store(StoreError),
    /// Servos could not be attached or detached
    Hardware(HardwareError),
}

impl From<StoreError> for ModeError {
    fn from(e: StoreError) -> Self {
        ModeError::Store(e)
    }
}

impl From<HardwareError> for ModeError {
    fn from(e: HardwareError) -> Self {
        ModeError::Hardware(e)
    }
}

impl Mode {
    /// Numeric code used by the host protocol
    pub fn code(&self) -> u8 {
        match self {
            Mode::Normal => 0,
            Mode::NormalConnected => 1,
            Mode::Learning => 2,
            Mode::SinglePlay => 3,
            Mode::LoopPlay => 4,
            Mode::LearningStop => 5,
        }
    }

    /// Check if this mode accepts live commands
    pub fn is_normal(&self) -> bool {
        matches!(self, Mode::Normal | Mode::NormalConnected)
    }

    /// Check if the log is being replayed
    pub fn is_playing(&self) -> bool {
        matches!(self, Mode::SinglePlay | Mode::LoopPlay)
    }

    /// Check if the log is being written
    pub fn is_learning(&self) -> bool {
        matches!(self, Mode::Learning | Mode::LearningStop)
    }

    /// Process an event and return the next mode
    pub fn transition(self, event: ModeEvent) -> Result<Mode, ModeError> {
        use Mode::*;
        use ModeEvent::*;

        match (self, event) {
            // Stop always wins
            (_, Stop) => Ok(Normal),

            // Normal transitions
            (Normal | NormalConnected, RecordStart) => Ok(Learning),
            (Normal | NormalConnected, PlayOnce) => Ok(SinglePlay),
            (Normal | NormalConnected, PlayLoop) => Ok(LoopPlay),
            (Normal | NormalConnected, LinkUp) => Ok(NormalConnected),
            (Normal | NormalConnected, LinkDown) => Ok(Normal),
            (Normal | NormalConnected, RecordStop | RecordingFlushed | PlaybackEnd) => {
                Err(self.reject(event))
            }

            // Learning transitions
            (Learning, RecordStop) => Ok(LearningStop),
            (
                Learning,
                RecordStart | PlayOnce | PlayLoop | LinkUp | LinkDown | RecordingFlushed
                | PlaybackEnd,
            ) => Err(self.reject(event)),

            // LearningStop transitions
            (LearningStop, RecordingFlushed) => Ok(Normal),
            (
                LearningStop,
                RecordStart | RecordStop | PlayOnce | PlayLoop | LinkUp | LinkDown | PlaybackEnd,
            ) => Err(self.reject(event)),

            // Playback transitions
            (SinglePlay, PlaybackEnd) => Ok(Normal),
            (LoopPlay, PlaybackEnd) => Ok(LoopPlay),
            (
                SinglePlay | LoopPlay,
                RecordStart | RecordStop | PlayOnce | PlayLoop | LinkUp | LinkDown
                | RecordingFlushed,
            ) => Err(self.reject(event)),
        }
    }

    fn reject(self, event: ModeEvent) -> ModeError {
        ModeError::InvalidTransition { from: self, event }
    }
}
