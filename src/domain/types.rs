use serde::{Deserialize, Serialize};
use std::ops::Index;
use strum::{Display, EnumString};
use validator::Validate;

use super::SimulationError;

// ============================================================================
// Time Series
// ============================================================================

/// Ordered, append-only sequence of samples
///
/// Index `i` always corresponds to simulated time `i × sample_time`.
/// Only the simulation engine appends; everyone else gets read-only views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSeries(Vec<f64>);

impl TimeSeries {
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    pub(crate) fn push(&mut self, value: f64) {
        self.0.push(value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    pub fn first(&self) -> Option<f64> {
        self.0.first().copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.0.last().copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.0.iter()
    }

    /// Smallest sample, `None` when empty
    pub fn min(&self) -> Option<f64> {
        self.0.iter().copied().reduce(f64::min)
    }

    /// Largest sample, `None` when empty
    pub fn max(&self) -> Option<f64> {
        self.0.iter().copied().reduce(f64::max)
    }

    /// Arithmetic mean, `None` when empty
    pub fn mean(&self) -> Option<f64> {
        if self.0.is_empty() {
            return None;
        }
        Some(self.0.iter().sum::<f64>() / self.0.len() as f64)
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for TimeSeries {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl AsRef<[f64]> for TimeSeries {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl Index<usize> for TimeSeries {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a f64;
    type IntoIter = std::slice::Iter<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ============================================================================
// PID Parameters
// ============================================================================

/// Named PID tunings
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TuningPreset {
    /// Kp 0.5, Ki 1.0, Kd 1.0
    #[default]
    Gentle,
    /// Kp 55.5, Ki 0.01, Kd 1.0
    HighGain,
    /// Gains taken verbatim from configuration
    Custom,
}

/// PID gains and target, immutable for the duration of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidParameters {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    /// Target temperature (°C)
    pub setpoint: f64,
}

impl PidParameters {
    pub const DEFAULT_SETPOINT_C: f64 = 18.0;

    pub fn new(kp: f64, ki: f64, kd: f64, setpoint: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            setpoint,
        }
    }

    /// Low proportional gain, strong integral action
    pub fn gentle() -> Self {
        Self::new(0.5, 1.0, 1.0, Self::DEFAULT_SETPOINT_C)
    }

    /// Aggressive proportional gain, almost no integral action
    pub fn high_gain() -> Self {
        Self::new(55.5, 0.01, 1.0, Self::DEFAULT_SETPOINT_C)
    }

    /// Parameters of a named preset, `None` for `Custom`
    pub fn from_preset(preset: TuningPreset, setpoint: f64) -> Option<Self> {
        match preset {
            TuningPreset::Gentle => Some(Self::gentle().with_setpoint(setpoint)),
            TuningPreset::HighGain => Some(Self::high_gain().with_setpoint(setpoint)),
            TuningPreset::Custom => None,
        }
    }

    pub fn with_setpoint(mut self, setpoint: f64) -> Self {
        self.setpoint = setpoint;
        self
    }

    pub fn check(&self) -> Result<(), SimulationError> {
        let fields = [
            ("kp", self.kp),
            ("ki", self.ki),
            ("kd", self.kd),
            ("setpoint", self.setpoint),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(SimulationError::invalid(format!(
                    "pid.{name} must be finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for PidParameters {
    fn default() -> Self {
        Self::gentle()
    }
}

// ============================================================================
// Thermal Parameters
// ============================================================================

/// Density of air at 20 °C (kg/m³)
pub const AIR_DENSITY_KG_PER_M3: f64 = 1.204;

/// Interior volume of the reference enclosure (L)
pub const ENCLOSURE_VOLUME_L: f64 = 72.0;

/// Air mass of an enclosure (kg), with a 0.01 volume factor applied to litres
pub fn air_mass_kg(volume_l: f64, density_kg_per_m3: f64) -> f64 {
    0.01 * volume_l * density_kg_per_m3
}

/// Physical constants of the enclosure, constant for a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ThermalParameters {
    /// Mass of the substance being cooled (kg)
    #[validate(range(exclusive_min = 0.0))]
    pub mass_kg: f64,

    /// Specific heat capacity of the substance
    #[validate(range(exclusive_min = 0.0))]
    pub specific_heat_capacity: f64,

    /// Thermal conductivity of the enclosure wall
    #[validate(range(min = 0.0))]
    pub conductivity: f64,

    /// Exterior surface area (m²)
    #[validate(range(min = 0.0))]
    pub surface_area_m2: f64,

    /// Energy the actuator removes per minute at 100% output (J/min)
    #[validate(range(min = 0.0))]
    pub max_actuator_energy_per_step: f64,

    /// Temperature of the surroundings (°C)
    pub ambient_temperature_c: f64,
}

impl Default for ThermalParameters {
    fn default() -> Self {
        Self {
            mass_kg: air_mass_kg(ENCLOSURE_VOLUME_L, AIR_DENSITY_KG_PER_M3),
            // 1 kJ raises 1 kg of air by 1 °C
            specific_heat_capacity: 1000.0,
            conductivity: 0.03,
            surface_area_m2: 1.4136,
            // Three 43 W thermoelectric modules: 3 × 2580 J/min
            max_actuator_energy_per_step: 7740.0,
            ambient_temperature_c: 20.0,
        }
    }
}

impl ThermalParameters {
    /// Heat capacity of the enclosure contents (`specific_heat_capacity × mass`)
    pub fn heat_capacity(&self) -> f64 {
        self.specific_heat_capacity * self.mass_kg
    }

    pub fn with_ambient(mut self, ambient_temperature_c: f64) -> Self {
        self.ambient_temperature_c = ambient_temperature_c;
        self
    }

    pub fn with_max_actuator_energy(mut self, energy_per_step: f64) -> Self {
        self.max_actuator_energy_per_step = energy_per_step;
        self
    }

    pub fn check(&self) -> Result<(), SimulationError> {
        Validate::validate(self)?;
        let fields = [
            ("mass_kg", self.mass_kg),
            ("specific_heat_capacity", self.specific_heat_capacity),
            ("conductivity", self.conductivity),
            ("surface_area_m2", self.surface_area_m2),
            (
                "max_actuator_energy_per_step",
                self.max_actuator_energy_per_step,
            ),
            ("ambient_temperature_c", self.ambient_temperature_c),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(SimulationError::invalid(format!(
                    "thermal.{name} must be finite, got {value}"
                )));
            }
        }
        let capacity = self.heat_capacity();
        if !(capacity.is_finite() && capacity > 0.0) {
            return Err(SimulationError::invalid(format!(
                "specific_heat_capacity × mass must be positive, got {capacity}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Simulation Config
// ============================================================================

/// How the PID integral and derivative terms are obtained each step
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AccumulationMode {
    /// Recompute from the whole history every step (O(n²) per run)
    #[default]
    FullHistory,
    /// Carry a running integral and the previous error (O(n) per run)
    Running,
}

/// Clock and seed settings of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SimulationConfig {
    /// Minutes between samples
    #[validate(range(exclusive_min = 0.0))]
    pub sample_time: f64,

    /// Minutes of simulated time
    #[validate(range(exclusive_min = 0.0))]
    pub run_duration: f64,

    /// Temperature at t = 0 (°C) when the constant seed is used
    pub starting_temperature_c: f64,

    pub accumulation: AccumulationMode,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sample_time: 0.1,
            run_duration: 5000.0,
            starting_temperature_c: 20.3,
            accumulation: AccumulationMode::FullHistory,
        }
    }
}

impl SimulationConfig {
    pub fn new(sample_time: f64, run_duration: f64, starting_temperature_c: f64) -> Self {
        Self {
            sample_time,
            run_duration,
            starting_temperature_c,
            ..Default::default()
        }
    }

    pub fn with_accumulation(mut self, accumulation: AccumulationMode) -> Self {
        self.accumulation = accumulation;
        self
    }

    pub fn check(&self) -> Result<(), SimulationError> {
        if !self.sample_time.is_finite() || !self.run_duration.is_finite() {
            return Err(SimulationError::invalid(format!(
                "sample_time and run_duration must be finite, got {} and {}",
                self.sample_time, self.run_duration
            )));
        }
        Validate::validate(self)?;
        if !self.starting_temperature_c.is_finite() {
            return Err(SimulationError::invalid(format!(
                "starting_temperature_c must be finite, got {}",
                self.starting_temperature_c
            )));
        }
        Ok(())
    }
}
