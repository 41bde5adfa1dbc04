use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::{PidParameters, SimulationConfig, ThermalParameters, TuningPreset};
use crate::report::OutputFormat;
use crate::simulation::{SeedKind, SimulationEngine};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const ENV_PREFIX: &str = "THERMOSIM__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub pid: PidConfig,
    pub thermal: ThermalParameters,
    pub seed: SeedConfig,
    pub output: OutputConfig,
}

/// Gains are read only when `preset = "custom"`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PidConfig {
    pub preset: TuningPreset,
    pub setpoint: f64,
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl Default for PidConfig {
    fn default() -> Self {
        let gentle = PidParameters::gentle();
        Self {
            preset: TuningPreset::Gentle,
            setpoint: gentle.setpoint,
            kp: gentle.kp,
            ki: gentle.ki,
            kd: gentle.kd,
        }
    }
}

impl PidConfig {
    pub fn parameters(&self) -> PidParameters {
        PidParameters::from_preset(self.preset, self.setpoint)
            .unwrap_or_else(|| PidParameters::new(self.kp, self.ki, self.kd, self.setpoint))
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub kind: SeedKind,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where to write the series; only the summary is logged when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub format: OutputFormat,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let figment = Self::figment(path);
        Ok(figment.extract()?)
    }

    /// Built-in defaults, then the TOML file, then `THERMOSIM__*` variables
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Engine wired with the configured parameters and seed strategy
    pub fn engine(&self) -> SimulationEngine {
        SimulationEngine::new(self.simulation, self.pid.parameters(), self.thermal)
            .with_initial_condition(self.seed.kind.build(self.simulation.starting_temperature_c))
    }
}
