//! Feature extraction for failure prediction
//!
//! Online inference and batch jobs extract from validated readings; training
//! extracts from wire records, where only the model's columns are required.
//! Both paths share one derivation.

use crate::error::ValidationError;
use crate::models::{error_code, finite, ErrorCode, FeatureVector, RawSensorReading, SensorReading};

/// Derives the model feature vector from a validated reading
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Pure and deterministic. The error flag is raised when any of the
    /// battery, motor or brake codes is a fault code.
    pub fn extract(&self, reading: &SensorReading) -> Result<FeatureVector, ValidationError> {
        derive(
            reading.battery.temperature,
            reading.motor.vibration_level,
            [
                reading.battery.error_code,
                reading.motor.error_code,
                reading.brake.error_code,
            ],
        )
    }

    /// Features from a wire record that may be missing non-feature fields.
    /// A missing feature column is a [`ValidationError::MissingField`].
    pub fn extract_raw(&self, raw: &RawSensorReading) -> Result<FeatureVector, ValidationError> {
        let battery = raw.battery.clone().unwrap_or_default();
        let motor = raw.motor.clone().unwrap_or_default();
        let brake = raw.brake_system.clone().unwrap_or_default();

        derive(
            finite(battery.temperature, "battery.temperature")?,
            finite(motor.vibration_level, "motor.vibration_level")?,
            [
                error_code(battery.error_code, "battery.error_code")?,
                error_code(motor.error_code, "motor.error_code")?,
                error_code(brake.error_code, "brake_system.error_code")?,
            ],
        )
    }

    pub fn extract_all(&self, readings: &[SensorReading]) -> Result<Vec<FeatureVector>, ValidationError> {
        readings.iter().map(|r| self.extract(r)).collect()
    }
}

fn derive(temperature: f64, vibration: f64, codes: [ErrorCode; 3]) -> Result<FeatureVector, ValidationError> {
    FeatureVector::new(temperature, vibration, codes.iter().any(ErrorCode::is_fault))
}
