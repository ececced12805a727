//! Recorded-motion log
//!
//! The log is a flat run of fixed-size entries starting right after the
//! calibration regions. Each entry holds the four joint angles and the
//! time since the previous entry:
//!
//! ```text
//! | rotation | left | right | hand | elapsed_ms |
//! |  u16 LE  |  ..  |  ..   |  ..  |   u16 LE   |
//! ```
//!
//! Angles are hundredths of a degree. An entry whose first field reads
//! 0xFFFF ends the log, which is also what an erased device reads as.

use heapless::Vec;

use crate::motion::JointAngles;

/// Size of one encoded entry
pub const ENTRY_LEN: usize = 10;

/// Marker in the first field of the terminating entry
pub const TERMINATOR: u16 = 0xFFFF;

/// Entries buffered in RAM before a flush
pub const BUFFERED_ENTRIES: usize = 6;

/// Largest angle that fits the centidegree encoding below the terminator
const MAX_ENCODED_ANGLE: f32 = 655.0;

/// One captured pose
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RecordingEntry {
    pub angles: JointAngles,
    /// Time since the previous entry
    pub elapsed_ms: u16,
}

fn encode_angle(angle: f32) -> u16 {
    let centi = libm::roundf(angle.clamp(0.0, MAX_ENCODED_ANGLE) * 100.0);
    centi as u16
}

fn decode_angle(raw: u16) -> f32 {
    f32::from(raw) / 100.0
}

impl RecordingEntry {
    pub fn new(angles: JointAngles, elapsed_ms: u16) -> Self {
        Self { angles, elapsed_ms }
    }

    pub fn encode(&self) -> [u8; ENTRY_LEN] {
        let fields = [
            encode_angle(self.angles.rotation),
            encode_angle(self.angles.left),
            encode_angle(self.angles.right),
            encode_angle(self.angles.hand),
            self.elapsed_ms,
        ];

        let mut out = [0u8; ENTRY_LEN];
        for (chunk, field) in out.chunks_exact_mut(2).zip(fields) {
            chunk.copy_from_slice(&field.to_le_bytes());
        }
        out
    }

    /// Decode an entry, `None` for the terminator
    pub fn decode(bytes: &[u8; ENTRY_LEN]) -> Option<Self> {
        let field = |i: usize| u16::from_le_bytes([bytes[2 * i], bytes[2 * i + 1]]);
        if field(0) == TERMINATOR {
            return None;
        }

        Some(Self {
            angles: JointAngles::new(
                decode_angle(field(0)),
                decode_angle(field(1)),
                decode_angle(field(2)),
                decode_angle(field(3)),
            ),
            elapsed_ms: field(4),
        })
    }

    /// The terminating entry
    pub fn terminator() -> [u8; ENTRY_LEN] {
        [0xFF; ENTRY_LEN]
    }
}

/// Write side of the log
///
/// Tracks the persisted cursor and the entries still held in RAM. Once
/// the region is full, further appends are dropped; one entry's worth of
/// space is always kept free for the terminator.
#[derive(Debug, Clone)]
pub struct LogWriter {
    start: u32,
    end: u32,
    cursor: u32,
    pending: Vec<u8, { ENTRY_LEN * BUFFERED_ENTRIES }>,
    entries: u32,
    dropped: u32,
}

impl LogWriter {
    /// Writer over `[start, end)`
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            start,
            end,
            cursor: start,
            pending: Vec::new(),
            entries: 0,
            dropped: 0,
        }
    }

    /// Rewind to the start and forget pending entries
    pub fn reset(&mut self) {
        self.cursor = self.start;
        self.pending.clear();
        self.entries = 0;
        self.dropped = 0;
    }

    /// Persisted cursor, where the next flush will land
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    /// Entries accepted since the last reset
    pub fn entries(&self) -> u32 {
        self.entries
    }

    /// Entries dropped for lack of space since the last reset
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Bytes waiting for a flush
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Buffer an entry; returns false if it was not taken
    ///
    /// Only a full region counts as a drop. A full RAM buffer just means
    /// the caller has to flush first.
    pub fn push(&mut self, entry: &RecordingEntry) -> bool {
        let used = self.cursor + self.pending.len() as u32;
        // Room for this entry plus the terminator
        if used + 2 * ENTRY_LEN as u32 > self.end {
            self.dropped += 1;
            return false;
        }
        if self.pending.extend_from_slice(&entry.encode()).is_err() {
            return false;
        }
        self.entries += 1;
        true
    }

    /// True when the buffer cannot take another entry
    pub fn needs_flush(&self) -> bool {
        self.pending.len() + ENTRY_LEN > self.pending.capacity()
    }

    /// Mark the pending bytes as written
    pub fn commit(&mut self) {
        self.cursor += self.pending.len() as u32;
        self.pending.clear();
    }
}

/// Address of entry `index` in a log starting at `start`
pub fn entry_offset(start: u32, index: u32) -> u32 {
    start + index * ENTRY_LEN as u32
}
