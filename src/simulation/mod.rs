//! # Enclosure Simulation Module
//!
//! Fixed-step simulation of a PID-cooled enclosure.
//!
//! ## Components
//!
//! - **Clock**: Timestamps from 0 to the run length, rounded to 2 decimals
//! - **Thermal**: Lumped energy balance advanced by one Euler step per sample
//! - **Seed**: Strategies supplying the starting temperature
//! - **Engine**: Couples controller and thermal model and records the series
//!
//! ## Usage
//!
//! ```rust
//! use enclosure_thermal_sim::domain::{PidParameters, SimulationConfig, ThermalParameters};
//! use enclosure_thermal_sim::simulation::SimulationEngine;
//!
//! let config = SimulationConfig::new(0.1, 10.0, 20.3);
//! let engine = SimulationEngine::new(
//!     config,
//!     PidParameters::high_gain(),
//!     ThermalParameters::default(),
//! );
//!
//! let result = engine.run().unwrap();
//! assert_eq!(result.temperature.len(), result.time.len() + 1);
//! ```

pub mod clock;
pub mod engine;
pub mod seed;
pub mod thermal;

pub use clock::{generate, round_hundredths, Clock};
pub use engine::{run, SimulationEngine, SimulationResult};
pub use seed::{ConstantSeed, InitialCondition, ReferenceCurve, SeedKind};
pub use thermal::{energy_balance, step, EnergyBalance, ThermalModel};
