//! Meter configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for a stress meter, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterConfig {
    /// Value the meter starts at and returns to on reset.
    pub starting_stress: f32,
    /// Upper bound. Reaching it exhausts the meter.
    pub max_stress: f32,
    /// Values at or above this are in the danger zone.
    pub danger_threshold: f32,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            starting_stress: 0.0,
            max_stress: 100.0,
            danger_threshold: 80.0,
        }
    }
}

impl MeterConfig {
    /// Check that the bounds are consistent.
    pub fn validate(&self) -> Result<(), MeterConfigError> {
        if !self.max_stress.is_finite() || self.max_stress <= 0.0 {
            return Err(MeterConfigError::InvalidMax(self.max_stress));
        }
        if !(0.0..=self.max_stress).contains(&self.danger_threshold) {
            return Err(MeterConfigError::ThresholdOutOfRange {
                threshold: self.danger_threshold,
                max: self.max_stress,
            });
        }
        if !(0.0..=self.max_stress).contains(&self.starting_stress) {
            return Err(MeterConfigError::StartOutOfRange {
                start: self.starting_stress,
                max: self.max_stress,
            });
        }
        Ok(())
    }
}

/// Errors for inconsistent meter bounds.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeterConfigError {
    #[error("max stress must be positive and finite, got {0}")]
    InvalidMax(f32),
    #[error("danger threshold {threshold} is outside [0, {max}]")]
    ThresholdOutOfRange { threshold: f32, max: f32 },
    #[error("starting stress {start} is outside [0, {max}]")]
    StartOutOfRange { start: f32, max: f32 },
}
