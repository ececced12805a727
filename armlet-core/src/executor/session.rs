//! Learning and playback bookkeeping

use crate::calibration::RecordingEntry;

/// Capture timing while learning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capture {
    last_ms: Option<u64>,
}

impl Capture {
    /// Elapsed time to log if a capture is due at `now_ms`
    ///
    /// The first capture of a session is due immediately and logs zero.
    pub fn due(&self, now_ms: u64, interval_ms: u32) -> Option<u16> {
        match self.last_ms {
            None => Some(0),
            Some(last) => {
                let elapsed = now_ms.saturating_sub(last);
                (elapsed >= u64::from(interval_ms)).then(|| elapsed.min(u64::from(u16::MAX)) as u16)
            }
        }
    }

    pub fn mark(&mut self, now_ms: u64) {
        self.last_ms = Some(now_ms);
    }
}

/// Cursor into the log while replaying it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playback {
    /// Index of the next entry to read
    pub cursor: u32,
    /// Entry read ahead and waiting for its time
    pub pending: Option<RecordingEntry>,
    /// When the previous entry was written out
    pub last_write_ms: u64,
}

impl Playback {
    pub fn new(now_ms: u64) -> Self {
        Self {
            cursor: 0,
            pending: None,
            last_write_ms: now_ms,
        }
    }

    /// True if the read-ahead entry should be written at `now_ms`
    pub fn is_due(&self, now_ms: u64) -> bool {
        match self.pending {
            Some(entry) => now_ms.saturating_sub(self.last_write_ms) >= u64::from(entry.elapsed_ms),
            None => false,
        }
    }

    /// Start over from the first entry
    pub fn rewind(&mut self) {
        self.cursor = 0;
        self.pending = None;
    }
}
