//! Core data models for the maintenance pipeline
//!
//! Wire records ([`RawSensorReading`]) mirror the ingestion JSON with every
//! field optional. They only become a [`SensorReading`] through
//! `TryFrom`, which rejects missing or out-of-domain values instead of
//! defaulting them.

use crate::error::ValidationError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of model input features
pub const NUM_FEATURES: usize = 3;

/// Feature column names, in model input order
pub const FEATURE_NAMES: [&str; NUM_FEATURES] =
    ["battery.temperature", "motor.vibration_level", "error_flag"];

/// Diagnostic code reported by a subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "NONE")]
    NoneReported,
    #[serde(rename = "WARN_TEMP")]
    WarnTemp,
    #[serde(rename = "ERR_VIB")]
    ErrVib,
    #[serde(rename = "LOW_BATT")]
    LowBatt,
    #[serde(rename = "BRAKE_WEAR")]
    BrakeWear,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 6] = [
        ErrorCode::Ok,
        ErrorCode::NoneReported,
        ErrorCode::WarnTemp,
        ErrorCode::ErrVib,
        ErrorCode::LowBatt,
        ErrorCode::BrakeWear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Ok => "OK",
            ErrorCode::NoneReported => "NONE",
            ErrorCode::WarnTemp => "WARN_TEMP",
            ErrorCode::ErrVib => "ERR_VIB",
            ErrorCode::LowBatt => "LOW_BATT",
            ErrorCode::BrakeWear => "BRAKE_WEAR",
        }
    }

    /// `OK` and `NONE` mean the subsystem reported nothing wrong
    pub fn is_fault(&self) -> bool {
        !matches!(self, ErrorCode::Ok | ErrorCode::NoneReported)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or(())
    }
}

/// GPS position of the vehicle; either coordinate may be absent
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryReading {
    /// Cell temperature in °C
    pub temperature: f64,
    pub voltage: f64,
    pub error_code: ErrorCode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorReading {
    pub vibration_level: f64,
    pub torque: f64,
    pub error_code: ErrorCode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrakeReading {
    #[serde(rename = "brake_pad_thickness")]
    pub pad_thickness: f64,
    pub temperature: f64,
    pub error_code: ErrorCode,
}

/// One validated telemetry record for a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSensorReading")]
pub struct SensorReading {
    pub component_id: String,
    pub vehicle_id: String,
    pub timestamp: NaiveDateTime,
    pub location: Option<Location>,
    pub battery: BatteryReading,
    pub motor: MotorReading,
    #[serde(rename = "brake_system")]
    pub brake: BrakeReading,
    pub last_service_date: NaiveDate,
    pub component_age_days: u32,
}

impl SensorReading {
    /// Parse and validate a single JSON record
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        let raw: RawSensorReading =
            serde_json::from_str(json).map_err(|e| ValidationError::Malformed(e.to_string()))?;
        Self::try_from(raw)
    }

    /// True if any subsystem reports a fault code
    pub fn has_fault_code(&self) -> bool {
        self.battery.error_code.is_fault()
            || self.motor.error_code.is_fault()
            || self.brake.error_code.is_fault()
    }
}

/// Ingestion record exactly as it arrives on the wire
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSensorReading {
    pub component_id: Option<String>,
    pub vehicle_id: Option<String>,
    pub timestamp: Option<String>,
    pub location: Option<Location>,
    pub battery: Option<RawBattery>,
    pub motor: Option<RawMotor>,
    #[serde(alias = "brake")]
    pub brake_system: Option<RawBrake>,
    pub last_service_date: Option<String>,
    pub component_age_days: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBattery {
    pub temperature: Option<f64>,
    pub voltage: Option<f64>,
    pub error_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMotor {
    pub vibration_level: Option<f64>,
    pub torque: Option<f64>,
    pub error_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBrake {
    #[serde(alias = "pad_thickness")]
    pub brake_pad_thickness: Option<f64>,
    pub temperature: Option<f64>,
    pub error_code: Option<String>,
}

impl TryFrom<RawSensorReading> for SensorReading {
    type Error = ValidationError;

    fn try_from(raw: RawSensorReading) -> Result<Self, Self::Error> {
        let battery = required(raw.battery, "battery")?;
        let motor = required(raw.motor, "motor")?;
        let brake = required(raw.brake_system, "brake_system")?;

        let battery = BatteryReading {
            temperature: finite(battery.temperature, "battery.temperature")?,
            voltage: finite(battery.voltage, "battery.voltage")?,
            error_code: error_code(battery.error_code, "battery.error_code")?,
        };
        let motor = MotorReading {
            vibration_level: finite(motor.vibration_level, "motor.vibration_level")?,
            torque: finite(motor.torque, "motor.torque")?,
            error_code: error_code(motor.error_code, "motor.error_code")?,
        };
        let brake = BrakeReading {
            pad_thickness: finite(brake.brake_pad_thickness, "brake_system.brake_pad_thickness")?,
            temperature: finite(brake.temperature, "brake_system.temperature")?,
            error_code: error_code(brake.error_code, "brake_system.error_code")?,
        };

        let location = raw.location.map(validate_location).transpose()?;

        let timestamp = parse_timestamp(&required(raw.timestamp, "timestamp")?)?;
        let last_service_date = {
            let value = required(raw.last_service_date, "last_service_date")?;
            NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                .map_err(|e| ValidationError::invalid("last_service_date", e.to_string()))?
        };

        let age = required(raw.component_age_days, "component_age_days")?;
        let component_age_days = u32::try_from(age)
            .map_err(|_| ValidationError::invalid("component_age_days", format!("{} is not a non-negative day count", age)))?;

        Ok(SensorReading {
            component_id: non_empty(raw.component_id, "component_id")?,
            vehicle_id: non_empty(raw.vehicle_id, "vehicle_id")?,
            timestamp,
            location,
            battery,
            motor,
            brake,
            last_service_date,
            component_age_days,
        })
    }
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, ValidationError> {
    value.ok_or_else(|| ValidationError::MissingField(field.to_string()))
}

pub(crate) fn finite(value: Option<f64>, field: &str) -> Result<f64, ValidationError> {
    let value = required(value, field)?;
    ensure_finite(value, field)
}

pub(crate) fn ensure_finite(value: f64, field: &str) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NonFinite {
            field: field.to_string(),
            value,
        })
    }
}

fn non_empty(value: Option<String>, field: &str) -> Result<String, ValidationError> {
    let value = required(value, field)?;
    if value.trim().is_empty() {
        return Err(ValidationError::invalid(field, "must not be empty"));
    }
    Ok(value)
}

pub(crate) fn error_code(value: Option<String>, field: &str) -> Result<ErrorCode, ValidationError> {
    let code = required(value, field)?;
    code.parse().map_err(|_| ValidationError::UnknownErrorCode {
        field: field.to_string(),
        code,
    })
}

fn validate_location(location: Location) -> Result<Location, ValidationError> {
    if let Some(lat) = location.latitude {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ValidationError::invalid("location.latitude", format!("{} is outside [-90, 90]", lat)));
        }
    }
    if let Some(lon) = location.longitude {
        if !(-180.0..=180.0).contains(&lon) {
            return Err(ValidationError::invalid("location.longitude", format!("{} is outside [-180, 180]", lon)));
        }
    }
    Ok(location)
}

/// Accepts RFC 3339 (normalised to UTC) or a naive ISO-8601 local timestamp
fn parse_timestamp(value: &str) -> Result<NaiveDateTime, ValidationError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .map_err(|e| ValidationError::invalid("timestamp", format!("`{}`: {}", value, e)))
}

/// A failure probability, always finite and within [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Probability(f64);

impl Probability {
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::ProbabilityOutOfRange(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Clamps into [0, 1]; a NaN score is read as maximum risk
    pub(crate) fn saturating(value: f64) -> Self {
        if value.is_nan() {
            Self(1.0)
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }
}

impl TryFrom<f64> for Probability {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Probability> for f64 {
    fn from(p: Probability) -> Self {
        p.0
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Model input derived from one reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub battery_temperature: f64,
    pub motor_vibration_level: f64,
    /// 1 if any subsystem reported a fault code, else 0
    pub error_flag: u8,
}

impl FeatureVector {
    pub fn new(
        battery_temperature: f64,
        motor_vibration_level: f64,
        has_error: bool,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            battery_temperature: ensure_finite(battery_temperature, "battery.temperature")?,
            motor_vibration_level: ensure_finite(motor_vibration_level, "motor.vibration_level")?,
            error_flag: u8::from(has_error),
        })
    }

    pub fn has_error(&self) -> bool {
        self.error_flag != 0
    }

    /// Values in [`FEATURE_NAMES`] order
    pub fn to_array(&self) -> [f64; NUM_FEATURES] {
        [
            self.battery_temperature,
            self.motor_vibration_level,
            f64::from(self.error_flag),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailurePrediction {
    pub component_id: String,
    pub vehicle_id: String,
    pub failure_probability: Probability,
    pub model_version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceAction {
    FixNow,
    Wait,
}

impl MaintenanceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceAction::FixNow => "FIX_NOW",
            MaintenanceAction::Wait => "WAIT",
        }
    }
}

impl fmt::Display for MaintenanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which decision rule produced the action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionRule {
    ExpectedCost,
    Threshold,
    ExpectedCostAndThreshold,
    Neither,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceDecision {
    pub component_id: String,
    pub vehicle_id: String,
    pub failure_probability: Probability,
    pub action: MaintenanceAction,
    pub rule: DecisionRule,
    pub expected_failure_cost: f64,
    pub explanation: String,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn reading_json(battery_code: &str, motor_code: &str, brake_code: &str) -> String {
        serde_json::json!({
            "component_id": "3f2c9a8e-1111-4d2b-9c1a-000000000001",
            "vehicle_id": "VH-4821",
            "timestamp": "2026-10-16T08:15:30.123456",
            "location": {"latitude": 6.52, "longitude": 3.37},
            "battery": {"temperature": 66.4, "voltage": 12.3, "error_code": battery_code},
            "motor": {"vibration_level": 0.48, "torque": 31.2, "error_code": motor_code},
            "brake_system": {"brake_pad_thickness": 0.9, "temperature": 75.1, "error_code": brake_code},
            "last_service_date": "2026-08-01",
            "component_age_days": 120
        })
        .to_string()
    }

    pub fn reading(battery_code: &str, motor_code: &str, brake_code: &str) -> SensorReading {
        SensorReading::from_json(&reading_json(battery_code, motor_code, brake_code)).unwrap()
    }
}
