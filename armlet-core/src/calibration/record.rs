//! Feedback calibration records
//!
//! Each servo with a feedback line gets a straight-line map from raw ADC
//! counts to degrees. Records are stored as a postcard payload followed
//! by a CRC-8, padded with the erased value to the block length.

use armlet_hal::StoreError;
use serde::{Deserialize, Serialize};

use crate::config::CALIBRATION_BLOCK_LEN;
use crate::motion::Joint;

/// Value of an erased EEPROM byte
pub const ERASED: u8 = 0xFF;

/// Nominal feedback reading at 0°
pub const FEEDBACK_MIN: u16 = 80;

/// Nominal feedback reading at 180°
pub const FEEDBACK_MAX: u16 = 605;

/// Assembly offsets of each joint in degrees
pub const ROTATION_OFFSET: f32 = 0.0;
pub const LEFT_OFFSET: f32 = 1.0;
pub const RIGHT_OFFSET: f32 = 5.6;

/// Plausible magnitudes for a fitted slope (degrees per count)
const SLOPE_MIN: f32 = 0.01;
const SLOPE_MAX: f32 = 5.0;

/// Plausible magnitude of a fitted intercept (degrees)
const INTERCEPT_MAX: f32 = 360.0;

/// Calibration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    /// Underlying store transfer failed
    Store(StoreError),
    /// Block has never been written
    Erased,
    /// Payload or checksum does not decode
    Corrupt,
    /// Coefficients decode but are not plausible
    Implausible,
    /// Joint has no persisted calibration
    NotCalibrated,
    /// Fewer than two samples given to `fit`
    TooFewSamples,
    /// All samples share one raw reading
    Degenerate,
}

impl From<StoreError> for CalibrationError {
    fn from(e: StoreError) -> Self {
        CalibrationError::Store(e)
    }
}

/// Linear map from raw feedback counts to degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationRecord {
    /// Degrees per ADC count
    pub slope: f32,
    /// Degrees at a raw reading of zero
    pub intercept: f32,
}

impl CalibrationRecord {
    pub const fn new(slope: f32, intercept: f32) -> Self {
        Self { slope, intercept }
    }

    /// Nominal 9 g servo line shifted by `offset` degrees
    pub fn nominal(offset: f32) -> Self {
        let slope = 180.0 / f32::from(FEEDBACK_MAX - FEEDBACK_MIN);
        Self {
            slope,
            intercept: offset - slope * f32::from(FEEDBACK_MIN),
        }
    }

    /// Built-in record used when nothing valid is stored
    pub fn default_for(joint: Joint) -> Self {
        match joint {
            Joint::Rotation => Self::nominal(ROTATION_OFFSET),
            Joint::Left => Self::nominal(LEFT_OFFSET),
            Joint::Right => Self::nominal(RIGHT_OFFSET),
            Joint::Hand => Self::nominal(0.0),
        }
    }

    /// Degrees for a raw reading
    pub fn angle(&self, raw: u16) -> f32 {
        self.slope * f32::from(raw) + self.intercept
    }

    /// Finite coefficients within the plausible band
    pub fn is_plausible(&self) -> bool {
        let slope = self.slope.abs();
        self.slope.is_finite()
            && self.intercept.is_finite()
            && (SLOPE_MIN..=SLOPE_MAX).contains(&slope)
            && self.intercept.abs() <= INTERCEPT_MAX
    }

    /// Least-squares line through (raw, degrees) pairs
    pub fn fit(samples: &[(u16, f32)]) -> Result<Self, CalibrationError> {
        if samples.len() < 2 {
            return Err(CalibrationError::TooFewSamples);
        }

        let n = samples.len() as f32;
        let mean_raw = samples.iter().map(|(raw, _)| f32::from(*raw)).sum::<f32>() / n;
        let mean_angle = samples.iter().map(|(_, angle)| *angle).sum::<f32>() / n;

        let mut sxx = 0.0f32;
        let mut sxy = 0.0f32;
        for (raw, angle) in samples {
            let dx = f32::from(*raw) - mean_raw;
            sxx += dx * dx;
            sxy += dx * (angle - mean_angle);
        }

        if sxx == 0.0 {
            return Err(CalibrationError::Degenerate);
        }

        let slope = sxy / sxx;
        Ok(Self {
            slope,
            intercept: mean_angle - slope * mean_raw,
        })
    }

    /// Encode into a persisted block
    pub fn encode_block(&self) -> Result<[u8; CALIBRATION_BLOCK_LEN], CalibrationError> {
        let mut block = [ERASED; CALIBRATION_BLOCK_LEN];
        let used = postcard::to_slice(self, &mut block[..CALIBRATION_BLOCK_LEN - 1])
            .map_err(|_| CalibrationError::Corrupt)?
            .len();
        block[used] = crc8(&block[..used]);
        Ok(block)
    }

    /// Decode and validate a persisted block
    pub fn decode_block(block: &[u8; CALIBRATION_BLOCK_LEN]) -> Result<Self, CalibrationError> {
        if block.iter().all(|b| *b == ERASED) {
            return Err(CalibrationError::Erased);
        }

        let (record, rest) = postcard::take_from_bytes::<Self>(block)
            .map_err(|_| CalibrationError::Corrupt)?;
        let used = CALIBRATION_BLOCK_LEN - rest.len();
        if rest.first() != Some(&crc8(&block[..used])) {
            return Err(CalibrationError::Corrupt);
        }

        if !record.is_plausible() {
            return Err(CalibrationError::Implausible);
        }
        Ok(record)
    }
}

/// CRC-8, polynomial 0x07, zero initial value
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x07
            } else {
                crc << 1
            };
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc8_check_value() {
        assert_eq!(crc8(b"123456789"), 0xF4);
        assert_eq!(crc8(&[]), 0);
    }

    #[test]
    fn test_nominal_line() {
        let record = CalibrationRecord::nominal(0.0);
        assert!((record.angle(FEEDBACK_MIN) - 0.0).abs() < 1e-3);
        assert!((record.angle(FEEDBACK_MAX) - 180.0).abs() < 1e-3);

        let right = CalibrationRecord::default_for(Joint::Right);
        assert!((right.angle(FEEDBACK_MIN) - RIGHT_OFFSET).abs() < 1e-3);
        assert!(right.is_plausible());
    }

    #[test]
    fn test_block_round_trip() {
        let record = CalibrationRecord::new(2.0, 10.0);
        let block = record.encode_block().unwrap();

        // postcard f32s are fixed width: 8 bytes of payload, then the CRC
        assert_eq!(block[8], crc8(&block[..8]));
        assert!(block[9..].iter().all(|b| *b == ERASED));

        assert_eq!(CalibrationRecord::decode_block(&block), Ok(record));
    }

    #[test]
    fn test_erased_block() {
        let block = [ERASED; CALIBRATION_BLOCK_LEN];
        assert_eq!(
            CalibrationRecord::decode_block(&block),
            Err(CalibrationError::Erased)
        );
    }

    #[test]
    fn test_corrupt_block() {
        let mut block = CalibrationRecord::new(2.0, 10.0).encode_block().unwrap();
        block[2] ^= 0x10;
        assert_eq!(
            CalibrationRecord::decode_block(&block),
            Err(CalibrationError::Corrupt)
        );
    }

    #[test]
    fn test_implausible_block() {
        let block = CalibrationRecord::new(50.0, 10.0).encode_block().unwrap();
        assert_eq!(
            CalibrationRecord::decode_block(&block),
            Err(CalibrationError::Implausible)
        );

        let block = CalibrationRecord::new(0.3, -1000.0).encode_block().unwrap();
        assert_eq!(
            CalibrationRecord::decode_block(&block),
            Err(CalibrationError::Implausible)
        );
    }

    #[test]
    fn test_fit_exact_line() {
        let samples = [(100u16, 210.0f32), (150, 310.0), (200, 410.0)];
        let record = CalibrationRecord::fit(&samples).unwrap();
        assert!((record.slope - 2.0).abs() < 1e-4);
        assert!((record.intercept - 10.0).abs() < 1e-2);
    }

    #[test]
    fn test_fit_noisy_line() {
        // Nominal servo with a little noise either side of the line
        let nominal = CalibrationRecord::nominal(0.0);
        let mut samples = [(0u16, 0.0f32); 8];
        for (i, sample) in samples.iter_mut().enumerate() {
            let raw = 100 + 60 * i as u16;
            let noise = if i % 2 == 0 { 0.5 } else { -0.5 };
            *sample = (raw, nominal.angle(raw) + noise);
        }

        let record = CalibrationRecord::fit(&samples).unwrap();
        assert!((record.slope - nominal.slope).abs() < 0.01);
        assert!((record.angle(300) - nominal.angle(300)).abs() < 1.0);
    }

    #[test]
    fn test_fit_rejects_bad_input() {
        assert_eq!(
            CalibrationRecord::fit(&[(100, 0.0)]),
            Err(CalibrationError::TooFewSamples)
        );
        assert_eq!(
            CalibrationRecord::fit(&[(100, 0.0), (100, 90.0)]),
            Err(CalibrationError::Degenerate)
        );
    }

    #[test]
    fn test_store_error_conversion() {
        let err: CalibrationError = StoreError::NoAcknowledge.into();
        assert_eq!(err, CalibrationError::Store(StoreError::NoAcknowledge));
    }
}
