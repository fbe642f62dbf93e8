//! Synthetic telemetry generator
//!
//! Produces readings in the ingestion format for demos and training
//! corpora. Seeded generators are fully reproducible.

use crate::error::ValidationError;
use crate::models::{
    BatteryReading, BrakeReading, ErrorCode, Location, MotorReading, SensorReading,
};
use chrono::{Duration, NaiveDateTime, Utc};
use rand::distributions::{Bernoulli, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Codes drawn for each subsystem, paired with [`ERROR_CODE_WEIGHTS`]
const ERROR_CODES: [ErrorCode; 6] = [
    ErrorCode::Ok,
    ErrorCode::WarnTemp,
    ErrorCode::ErrVib,
    ErrorCode::LowBatt,
    ErrorCode::BrakeWear,
    ErrorCode::NoneReported,
];
const ERROR_CODE_WEIGHTS: [u32; 6] = [60, 10, 10, 10, 5, 5];

const LATITUDE_RANGE: (f64, f64) = (4.3, 13.9);
const LONGITUDE_RANGE: (f64, f64) = (3.3, 14.7);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Share of readings with injected overheating, vibration and wear
    pub anomaly_rate: f64,
    /// Timestamp of the first reading
    pub start: NaiveDateTime,
    /// Gap between consecutive readings
    pub interval_ms: i64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            anomaly_rate: 0.05,
            start: Utc::now().naive_utc(),
            interval_ms: 100,
        }
    }
}

pub struct TelemetrySimulator {
    rng: StdRng,
    config: SimulationConfig,
    anomaly: Bernoulli,
    error_codes: WeightedIndex<u32>,
    emitted: i64,
}

impl TelemetrySimulator {
    /// Fails when `anomaly_rate` is not a probability (NaN included)
    pub fn new(config: SimulationConfig, seed: Option<u64>) -> Result<Self, ValidationError> {
        let anomaly = Bernoulli::new(config.anomaly_rate).map_err(|_| {
            ValidationError::invalid(
                "anomaly_rate",
                format!("{} is not within [0, 1]", config.anomaly_rate),
            )
        })?;
        let error_codes = WeightedIndex::new(ERROR_CODE_WEIGHTS)
            .map_err(|e| ValidationError::invalid("error_code_weights", e.to_string()))?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            rng,
            config,
            anomaly,
            error_codes,
            emitted: 0,
        })
    }

    pub fn seeded(seed: u64) -> Result<Self, ValidationError> {
        Self::new(SimulationConfig::default(), Some(seed))
    }

    /// Standard normal sample via Box-Muller
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1: f64 = 1.0 - self.rng.gen::<f64>();
        let u2: f64 = self.rng.gen();
        mean + std_dev * (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
    }

    fn error_code(&mut self) -> ErrorCode {
        ERROR_CODES[self.rng.sample(&self.error_codes)]
    }

    /// One reading for `component_id`
    pub fn reading_for(&mut self, component_id: impl Into<String>) -> SensorReading {
        let mut temperature = round(self.gauss(65.0, 5.0), 2);
        let mut vibration = round(self.gauss(0.5, 0.1), 3);
        let mut voltage = round(self.rng.gen_range(11.5..13.0), 2);
        let mut pad_thickness = round(self.rng.gen_range(0.4..1.5), 2);

        if self.rng.sample(self.anomaly) {
            temperature += self.rng.gen_range(15.0..30.0);
            vibration += self.rng.gen_range(0.5..1.2);
            voltage -= self.rng.gen_range(1.0..2.0);
            pad_thickness -= self.rng.gen_range(0.2..0.4);
        }

        let timestamp = self.config.start + Duration::milliseconds(self.config.interval_ms * self.emitted);
        self.emitted += 1;

        let location = Location {
            latitude: Some(round(self.rng.gen_range(LATITUDE_RANGE.0..LATITUDE_RANGE.1), 6)),
            longitude: Some(round(self.rng.gen_range(LONGITUDE_RANGE.0..LONGITUDE_RANGE.1), 6)),
        };
        let vehicle_id = format!("VH-{}", self.rng.gen_range(1000..=9999));
        let battery = BatteryReading {
            temperature,
            voltage,
            error_code: self.error_code(),
        };
        let motor = MotorReading {
            vibration_level: vibration,
            torque: round(self.rng.gen_range(10.0..50.0), 2),
            error_code: self.error_code(),
        };
        let brake = BrakeReading {
            pad_thickness,
            temperature: round(temperature + self.rng.gen_range(5.0..15.0), 2),
            error_code: self.error_code(),
        };
        let last_service_date = timestamp.date() - Duration::days(self.rng.gen_range(1..=90));

        SensorReading {
            component_id: component_id.into(),
            vehicle_id,
            timestamp,
            location: Some(location),
            battery,
            motor,
            brake,
            last_service_date,
            component_age_days: self.rng.gen_range(5..=365),
        }
    }

    /// One reading with a fresh random component id
    pub fn next_reading(&mut self) -> SensorReading {
        let id = uuid::Builder::from_random_bytes(self.rng.gen()).into_uuid();
        self.reading_for(id.to_string())
    }

    pub fn generate(&mut self, count: usize) -> Vec<SensorReading> {
        (0..count).map(|_| self.next_reading()).collect()
    }
}

fn round(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
