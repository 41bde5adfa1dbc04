//! # Simulation Clock
//!
//! Generates the discrete timestamps of a run. Each timestamp is derived from
//! the previous one and rounded to two decimals straight away, so that
//! floating-point drift never accumulates into the index arithmetic.

use crate::domain::SimulationError;

/// Resolution of generated timestamps (1 / 100 of a minute)
const TIME_SCALE: f64 = 100.0;

/// Largest run duration whose hundredths are still exact integers in an f64
pub const MAX_RUN_DURATION: f64 = 9_007_199_254_740_992.0 / TIME_SCALE;

/// Ceiling on the up-front timestamp allocation
const MAX_CAPACITY_HINT: usize = 1 << 20;

/// Round to two decimals (the clock resolution)
pub fn round_hundredths(value: f64) -> f64 {
    (value * TIME_SCALE).round() / TIME_SCALE
}

/// Fixed-step clock of a single run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clock {
    sample_time: f64,
    run_duration: f64,
}

impl Clock {
    pub fn new(sample_time: f64, run_duration: f64) -> Result<Self, SimulationError> {
        if !(sample_time.is_finite() && sample_time > 0.0) {
            return Err(SimulationError::invalid(format!(
                "sample_time must be positive and finite, got {sample_time}"
            )));
        }
        if !(run_duration.is_finite() && run_duration > 0.0) {
            return Err(SimulationError::invalid(format!(
                "run_duration must be positive and finite, got {run_duration}"
            )));
        }
        if run_duration > MAX_RUN_DURATION {
            return Err(SimulationError::invalid(format!(
                "run_duration {run_duration} exceeds the clock range of {MAX_RUN_DURATION}"
            )));
        }
        Ok(Self {
            sample_time,
            run_duration,
        })
    }

    /// Expected number of timestamps, capped for use as a capacity hint
    pub fn estimated_len(&self) -> usize {
        let steps = (self.run_duration / self.sample_time).ceil() as usize;
        steps.saturating_add(2).min(MAX_CAPACITY_HINT)
    }

    /// Produce `0, t1, t2, …` while the last value is below `run_duration`
    ///
    /// The first value that is not below `run_duration` is the last element.
    pub fn timestamps(&self) -> Result<Vec<f64>, SimulationError> {
        let mut time = Vec::with_capacity(self.estimated_len());
        let mut current = 0.0;
        time.push(current);

        while current < self.run_duration {
            let next = round_hundredths(current + self.sample_time);
            if next <= current {
                return Err(SimulationError::invalid(format!(
                    "sample_time {} is below the clock resolution of {}",
                    self.sample_time,
                    1.0 / TIME_SCALE
                )));
            }
            time.push(next);
            current = next;
        }

        Ok(time)
    }
}

/// Generate the timestamps of a run
pub fn generate(sample_time: f64, run_duration: f64) -> Result<Vec<f64>, SimulationError> {
    Clock::new(sample_time, run_duration)?.timestamps()
}
