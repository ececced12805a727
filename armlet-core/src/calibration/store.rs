//! Persistent calibration and recording store
//!
//! Owns the byte store and everything that lives in it: one calibration
//! block per feedback joint on the system device and the recorded-motion
//! log on the user device.

use armlet_hal::{ByteStore, StoreError};

use super::record::{CalibrationError, CalibrationRecord};
use super::recording::{entry_offset, LogWriter, RecordingEntry, ENTRY_LEN};
use crate::config::{StoreLayout, CALIBRATION_BLOCK_LEN};
use crate::motion::Joint;

/// Where a joint's active record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordSource {
    /// Loaded from the store
    Stored,
    /// Built-in fallback
    Default,
}

/// Calibration records in RAM plus access to the persisted log
pub struct CalibrationStore<B> {
    bus: B,
    layout: StoreLayout,
    records: [CalibrationRecord; 4],
    sources: [RecordSource; 4],
    writer: LogWriter,
}

impl<B: ByteStore> CalibrationStore<B> {
    /// Store with built-in records for every joint
    pub fn new(bus: B, layout: StoreLayout) -> Self {
        Self {
            bus,
            layout,
            records: Joint::ALL.map(CalibrationRecord::default_for),
            sources: [RecordSource::Default; 4],
            writer: LogWriter::new(u32::from(layout.recording_start()), layout.recording_end()),
        }
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// Read and validate the persisted record for `joint`
    ///
    /// Does not touch the in-memory copy.
    pub fn read_calibration(&mut self, joint: Joint) -> Result<CalibrationRecord, CalibrationError> {
        let offset = self
            .layout
            .calibration_offset(joint)
            .ok_or(CalibrationError::NotCalibrated)?;

        let mut block = [0u8; CALIBRATION_BLOCK_LEN];
        self.bus
            .read_block(self.layout.variant.system_device(), offset, &mut block)?;
        CalibrationRecord::decode_block(&block)
    }

    /// Load the record for `joint`, falling back to the built-in one
    ///
    /// Returns the active record together with the reason for a fallback,
    /// if any. Failures never propagate further than this.
    pub fn load_calibration(
        &mut self,
        joint: Joint,
    ) -> (CalibrationRecord, Result<(), CalibrationError>) {
        let idx = joint.index();
        match self.read_calibration(joint) {
            Ok(record) => {
                self.records[idx] = record;
                self.sources[idx] = RecordSource::Stored;
                (record, Ok(()))
            }
            Err(e) => {
                self.records[idx] = CalibrationRecord::default_for(joint);
                self.sources[idx] = RecordSource::Default;
                (self.records[idx], Err(e))
            }
        }
    }

    /// Load every feedback joint, reporting each outcome
    pub fn load_all(&mut self) -> [(Joint, Result<(), CalibrationError>); 3] {
        Joint::CALIBRATED.map(|joint| (joint, self.load_calibration(joint).1))
    }

    /// Persist a record for `joint` and make it active
    pub fn store_calibration(
        &mut self,
        joint: Joint,
        record: CalibrationRecord,
    ) -> Result<(), CalibrationError> {
        let offset = self
            .layout
            .calibration_offset(joint)
            .ok_or(CalibrationError::NotCalibrated)?;
        if !record.is_plausible() {
            return Err(CalibrationError::Implausible);
        }

        let block = record.encode_block()?;
        self.bus
            .write_block(self.layout.variant.system_device(), offset, &block)?;

        self.records[joint.index()] = record;
        self.sources[joint.index()] = RecordSource::Stored;
        Ok(())
    }

    /// Active record for `joint`
    pub fn record(&self, joint: Joint) -> &CalibrationRecord {
        &self.records[joint.index()]
    }

    pub fn source(&self, joint: Joint) -> RecordSource {
        self.sources[joint.index()]
    }

    /// Start a new log, discarding the previous one
    pub fn begin_recording(&mut self) -> Result<(), StoreError> {
        self.writer.reset();
        self.write_terminator(self.writer.cursor())
    }

    /// Queue a captured pose for the log
    ///
    /// Entries past the end of the region are dropped without error. A
    /// buffer left full by an earlier failed flush is flushed again first;
    /// if that still fails the entry is not taken and the error returned.
    pub fn append_recording_sample(&mut self, entry: &RecordingEntry) -> Result<(), StoreError> {
        if self.writer.needs_flush() {
            self.flush_recording()?;
        }
        if !self.writer.push(entry) {
            return Ok(());
        }
        if self.writer.needs_flush() {
            self.flush_recording()?;
        }
        Ok(())
    }

    /// Write buffered entries out
    pub fn flush_recording(&mut self) -> Result<(), StoreError> {
        if self.writer.pending().is_empty() {
            return Ok(());
        }
        let offset = self.log_offset(self.writer.cursor())?;
        self.bus
            .write_block(self.layout.variant.user_device(), offset, self.writer.pending())?;
        self.writer.commit();
        Ok(())
    }

    /// Flush and terminate the log; returns the number of entries kept
    pub fn finish_recording(&mut self) -> Result<u32, StoreError> {
        self.flush_recording()?;
        self.write_terminator(self.writer.cursor())?;
        Ok(self.writer.entries())
    }

    /// Drop the session in progress, leaving an empty log
    pub fn abandon_recording(&mut self) -> Result<(), StoreError> {
        self.writer.reset();
        self.write_terminator(self.writer.cursor())
    }

    /// Entry `index` of the persisted log, `None` past the end
    pub fn read_recording_sample(&mut self, index: u32) -> Result<Option<RecordingEntry>, StoreError> {
        let addr = entry_offset(u32::from(self.layout.recording_start()), index);
        if addr + ENTRY_LEN as u32 > self.layout.recording_end() {
            return Ok(None);
        }

        let mut bytes = [0u8; ENTRY_LEN];
        let offset = self.log_offset(addr)?;
        self.bus
            .read_block(self.layout.variant.user_device(), offset, &mut bytes)?;
        Ok(RecordingEntry::decode(&bytes))
    }

    /// True if the log holds at least one entry
    pub fn has_recording(&mut self) -> Result<bool, StoreError> {
        Ok(self.read_recording_sample(0)?.is_some())
    }

    /// Entries accepted in the current session
    pub fn recorded_entries(&self) -> u32 {
        self.writer.entries()
    }

    /// Entries dropped for lack of space in the current session
    pub fn dropped_samples(&self) -> u32 {
        self.writer.dropped()
    }

    fn write_terminator(&mut self, addr: u32) -> Result<(), StoreError> {
        let offset = self.log_offset(addr)?;
        self.bus.write_block(
            self.layout.variant.user_device(),
            offset,
            &RecordingEntry::terminator(),
        )
    }

    fn log_offset(&self, addr: u32) -> Result<u16, StoreError> {
        u16::try_from(addr).map_err(|_| StoreError::OutOfBounds)
    }

    /// Access the underlying store
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}
