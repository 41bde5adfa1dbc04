//! # Initial Conditions
//!
//! Strategies that supply `temperature[0]` to the engine. The constant seed
//! is the usual choice; the reference curve reproduces an undisturbed decaying
//! oscillation around 20 °C and also yields the sampled curve so a run can be
//! compared against it.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt::Debug;
use strum::{Display, EnumString};

use super::clock::round_hundredths;

/// Provider of the starting temperature of a run
pub trait InitialCondition: Debug + Send + Sync {
    /// Temperature at `time[0]`
    fn starting_temperature(&self, time: &[f64]) -> f64;

    /// Series to compare the controlled run against, if the strategy has one
    fn reference_series(&self, _time: &[f64]) -> Option<Vec<f64>> {
        None
    }

    fn name(&self) -> &'static str;
}

/// A fixed starting temperature
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantSeed(pub f64);

impl InitialCondition for ConstantSeed {
    fn starting_temperature(&self, _time: &[f64]) -> f64 {
        self.0
    }

    fn name(&self) -> &'static str {
        "constant"
    }
}

/// Closed-form curve `0.3 · e^(−t) · cos(20πt / 7) + 20`, rounded to 2 decimals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceCurve {
    pub amplitude: f64,
    pub baseline: f64,
    pub angular_frequency: f64,
}

impl Default for ReferenceCurve {
    fn default() -> Self {
        Self {
            amplitude: 0.3,
            baseline: 20.0,
            angular_frequency: 20.0 * PI / 7.0,
        }
    }
}

impl ReferenceCurve {
    /// Curve value at time `t`
    pub fn value_at(&self, t: f64) -> f64 {
        let raw = self.amplitude * (-t).exp() * (self.angular_frequency * t).cos() + self.baseline;
        round_hundredths(raw)
    }

    /// Curve sampled over the given timestamps
    pub fn sample(&self, time: &[f64]) -> Vec<f64> {
        time.iter().map(|&t| self.value_at(t)).collect()
    }
}

impl InitialCondition for ReferenceCurve {
    fn starting_temperature(&self, time: &[f64]) -> f64 {
        self.value_at(time.first().copied().unwrap_or(0.0))
    }

    fn reference_series(&self, time: &[f64]) -> Option<Vec<f64>> {
        Some(self.sample(time))
    }

    fn name(&self) -> &'static str {
        "reference_curve"
    }
}

/// Configurable selection of the initial-condition strategy
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SeedKind {
    #[default]
    Constant,
    ReferenceCurve,
}

impl SeedKind {
    /// Build the strategy; `starting_temperature_c` feeds the constant seed
    pub fn build(self, starting_temperature_c: f64) -> Box<dyn InitialCondition> {
        match self {
            SeedKind::Constant => Box::new(ConstantSeed(starting_temperature_c)),
            SeedKind::ReferenceCurve => Box::new(ReferenceCurve::default()),
        }
    }
}
