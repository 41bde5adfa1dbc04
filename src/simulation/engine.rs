//! # Simulation Engine
//!
//! Drives the clock and, at every timestep, asks the controller for an
//! actuator command and the thermal model for the next temperature. The
//! engine is the only writer of the temperature and output series; they are
//! handed back as an immutable [`SimulationResult`] once the last timestep has
//! been processed.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::clock::Clock;
use super::seed::{ConstantSeed, InitialCondition};
use super::thermal::ThermalModel;
use crate::controller::{PidController, RunningPidController};
use crate::domain::{
    AccumulationMode, PidParameters, SimulationConfig, SimulationError, ThermalParameters,
    TimeSeries,
};

/// Number of progress events logged over a run
const PROGRESS_EVENTS: usize = 10;

/// Series produced by one run
///
/// `temperature` and `output` hold one sample more than `time`: both are
/// seeded before the loop and appended once per timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub time: TimeSeries,
    pub temperature: TimeSeries,
    pub output: TimeSeries,
    /// Undisturbed curve sampled over `time`, when the seed provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<TimeSeries>,
}

impl SimulationResult {
    /// Number of processed timesteps
    pub fn steps(&self) -> usize {
        self.time.len()
    }
}

/// Controller variant selected by [`AccumulationMode`]
enum OutputLaw {
    FullHistory(PidController),
    Running(RunningPidController),
}

impl OutputLaw {
    fn new(mode: AccumulationMode, params: PidParameters, sample_time: f64) -> Self {
        match mode {
            AccumulationMode::FullHistory => {
                OutputLaw::FullHistory(PidController::new(params, sample_time))
            }
            AccumulationMode::Running => {
                OutputLaw::Running(RunningPidController::new(params, sample_time))
            }
        }
    }

    /// Output for the newest sample; the history grows by one between calls
    fn next_output(&mut self, history: &[f64]) -> Result<f64, SimulationError> {
        match self {
            OutputLaw::FullHistory(pid) => pid.compute_output(history),
            OutputLaw::Running(pid) => history
                .last()
                .map(|&measured| pid.update(measured))
                .ok_or(SimulationError::InsufficientHistory),
        }
    }
}

/// Coupled controller / thermal-model loop
#[derive(Debug)]
pub struct SimulationEngine {
    config: SimulationConfig,
    pid: PidParameters,
    thermal: ThermalParameters,
    initial_condition: Box<dyn InitialCondition>,
    cancellation: Option<CancellationToken>,
}

impl SimulationEngine {
    /// Create an engine seeded with the configured constant starting temperature
    pub fn new(config: SimulationConfig, pid: PidParameters, thermal: ThermalParameters) -> Self {
        Self {
            config,
            pid,
            thermal,
            initial_condition: Box::new(ConstantSeed(config.starting_temperature_c)),
            cancellation: None,
        }
    }

    /// Replace the initial-condition strategy
    pub fn with_initial_condition(mut self, initial_condition: Box<dyn InitialCondition>) -> Self {
        self.initial_condition = initial_condition;
        self
    }

    /// Check this token between timesteps and abort once it is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Validate every parameter once, before any series is produced
    pub fn validate(&self) -> Result<(), SimulationError> {
        self.config.check()?;
        self.pid.check()?;
        self.thermal.check()?;
        Ok(())
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Run the simulation to the last timestamp of the clock
    pub fn run(&self) -> Result<SimulationResult, SimulationError> {
        if let Err(error) = self.validate() {
            warn!(error = %error, kind = error.kind(), "rejecting simulation configuration");
            return Err(error);
        }

        let sample_time = self.config.sample_time;
        let time = Clock::new(sample_time, self.config.run_duration)?.timestamps()?;
        let thermal = ThermalModel::new(self.thermal, sample_time)?;
        let mut law = OutputLaw::new(self.config.accumulation, self.pid, sample_time);

        let starting_temperature = self.initial_condition.starting_temperature(&time);
        if !starting_temperature.is_finite() {
            return Err(SimulationError::invalid(format!(
                "initial condition '{}' produced a non-finite temperature",
                self.initial_condition.name()
            )));
        }

        let mut temperature = TimeSeries::with_capacity(time.len() + 1);
        let mut output = TimeSeries::with_capacity(time.len() + 1);
        temperature.push(starting_temperature);
        output.push(law.next_output(temperature.as_slice())?);

        info!(
            steps = time.len(),
            sample_time,
            run_duration = self.config.run_duration,
            starting_temperature,
            setpoint = self.pid.setpoint,
            accumulation = %self.config.accumulation,
            seed = self.initial_condition.name(),
            "starting simulation"
        );

        let progress_every = (time.len() / PROGRESS_EVENTS).max(1);

        for (step, &now) in time.iter().enumerate() {
            if self.is_cancelled() {
                warn!(completed_steps = step, "simulation cancelled");
                return Err(SimulationError::Cancelled {
                    completed_steps: step,
                });
            }

            let balance = thermal.energy_balance(temperature[step], output[step]);
            trace!(
                step,
                time = now,
                output = output[step],
                external_energy = balance.external_energy,
                actuator_energy = balance.actuator_energy,
                total_energy = balance.total_energy,
                temperature_change = balance.temperature_change,
                temperature = balance.next_temperature_c,
                "thermal step"
            );

            temperature.push(balance.next_temperature_c);
            output.push(law.next_output(temperature.as_slice())?);

            if step % progress_every == 0 {
                debug!(
                    step,
                    time = now,
                    temperature = balance.next_temperature_c,
                    "simulation progress"
                );
            }
        }

        let reference = self
            .initial_condition
            .reference_series(&time)
            .map(TimeSeries::from);

        info!(
            steps = time.len(),
            final_temperature = temperature.last(),
            final_output = output.last(),
            "simulation complete"
        );

        Ok(SimulationResult {
            time: TimeSeries::from(time),
            temperature,
            output,
            reference,
        })
    }
}

/// Run one simulation with the constant starting temperature of `config`
pub fn run(
    config: &SimulationConfig,
    pid: &PidParameters,
    thermal: &ThermalParameters,
) -> Result<SimulationResult, SimulationError> {
    SimulationEngine::new(*config, *pid, *thermal).run()
}
