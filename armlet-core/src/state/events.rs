//! Events that trigger mode transitions

use serde::{Deserialize, Serialize};

/// Events that can trigger mode transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeEvent {
    // Dispatcher events
    /// Start capturing hand-guided motion
    RecordStart,
    /// Stop capturing and persist the log
    RecordStop,
    /// Replay the log once
    PlayOnce,
    /// Replay the log until stopped
    PlayLoop,
    /// Abandon whatever is running and return to normal
    Stop,

    // Link events
    /// Host link (Bluetooth) came up
    LinkUp,
    /// Host link went away
    LinkDown,

    // Executor events
    /// Pending log writes reached the store
    RecordingFlushed,
    /// Playback cursor reached the end of the log
    PlaybackEnd,
}

impl ModeEvent {
    /// Check if this event comes from the dispatcher
    pub fn is_command(&self) -> bool {
        matches!(
            self,
            ModeEvent::RecordStart
                | ModeEvent::RecordStop
                | ModeEvent::PlayOnce
                | ModeEvent::PlayLoop
                | ModeEvent::Stop
        )
    }

    /// Check if this event is raised by the executor itself
    pub fn is_internal(&self) -> bool {
        matches!(self, ModeEvent::RecordingFlushed | ModeEvent::PlaybackEnd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_events() {
        assert!(ModeEvent::RecordStart.is_command());
        assert!(ModeEvent::Stop.is_command());
        assert!(!ModeEvent::LinkUp.is_command());
        assert!(!ModeEvent::PlaybackEnd.is_command());
    }

    #[test]
    fn test_internal_events() {
        assert!(ModeEvent::RecordingFlushed.is_internal());
        assert!(ModeEvent::PlaybackEnd.is_internal());
        assert!(!ModeEvent::PlayOnce.is_internal());
    }
}
