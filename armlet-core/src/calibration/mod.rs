//! Feedback calibration and the recorded-motion log
//!
//! Both live in the external EEPROM. Calibration is read once at boot
//! and kept in RAM; the log is streamed in and out while learning and
//! playing back.

pub mod record;
pub mod recording;
pub mod store;

pub use record::{crc8, CalibrationError, CalibrationRecord};
pub use recording::{RecordingEntry, ENTRY_LEN};
pub use store::{CalibrationStore, RecordSource};
