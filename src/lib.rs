//! Closed-loop thermal control simulation of a cooled enclosure.
//!
//! A PID controller reads the full measured-temperature history and commands
//! a bounded cooling actuator; a lumped thermal model advances the enclosure
//! temperature one explicit Euler step per sample. The run is offline and
//! deterministic and yields the time, temperature and output series.

pub mod config;
pub mod controller;
pub mod domain;
pub mod report;
pub mod simulation;
pub mod telemetry;

pub use controller::{PidController, RunningPidController};
pub use domain::{
    AccumulationMode, PidParameters, SimulationConfig, SimulationError, ThermalParameters,
    TimeSeries, TuningPreset,
};
pub use simulation::{SimulationEngine, SimulationResult};
