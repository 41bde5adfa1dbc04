/// PID (Proportional-Integral-Derivative) Controller for a cooling actuator
///
/// The controller turns the measured temperature history into a duty
/// percentage for a unidirectional cooler. Because the actuator removes heat,
/// the error is taken as `measured - setpoint`: a positive error means the
/// enclosure is too warm and the cooler should work harder.
///
/// # Theory
/// - **P (Proportional)**: Responds to the current error
/// - **I (Integral)**: Responds to accumulated past errors
/// - **D (Derivative)**: Responds to the rate of error change
///
/// Output = clamp(Kp * e[n] + Ki * Σ e[k]*dt + Kd * (e[n] - e[n-1])/dt, 0, 100)
use crate::domain::{PidParameters, SimulationError};

/// Lower bound of the actuator command (%)
pub const OUTPUT_MIN: f64 = 0.0;
/// Upper bound of the actuator command (%)
pub const OUTPUT_MAX: f64 = 100.0;

/// The three contributions to one controller output, before saturation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidTerms {
    pub proportional: f64,
    pub integral: f64,
    pub derivative: f64,
}

impl PidTerms {
    /// Unsaturated controller output
    pub fn raw(&self) -> f64 {
        self.proportional + self.integral + self.derivative
    }

    /// Output saturated to the actuator range
    ///
    /// Opposing infinite terms sum to NaN; the actuator is then held off.
    pub fn output(&self) -> f64 {
        let raw = self.raw();
        if raw.is_nan() {
            return OUTPUT_MIN;
        }
        raw.clamp(OUTPUT_MIN, OUTPUT_MAX)
    }
}

/// Compute the PID terms from the entire measured history
///
/// The integral is a left-Riemann sum over every sample, recomputed from
/// scratch on each call. A single-sample history has no derivative term.
pub fn compute_terms(
    history: &[f64],
    params: &PidParameters,
    sample_time: f64,
) -> Result<PidTerms, SimulationError> {
    let (&last, earlier) = history
        .split_last()
        .ok_or(SimulationError::InsufficientHistory)?;

    let setpoint = params.setpoint;
    let integral_error = history
        .iter()
        .fold(0.0, |acc, &measured| acc + (measured - setpoint) * sample_time);

    let error = last - setpoint;
    let derivative_error = match earlier.last() {
        Some(&previous) => (error - (previous - setpoint)) / sample_time,
        None => 0.0,
    };

    Ok(PidTerms {
        proportional: params.kp * error,
        integral: params.ki * integral_error,
        derivative: params.kd * derivative_error,
    })
}

/// Saturated actuator command (%) for the current instant
pub fn compute_output(
    history: &[f64],
    params: &PidParameters,
    sample_time: f64,
) -> Result<f64, SimulationError> {
    compute_terms(history, params, sample_time).map(|terms| terms.output())
}

/// Stateless controller bound to one parameter set and sample time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidController {
    params: PidParameters,
    sample_time: f64,
}

impl PidController {
    pub fn new(params: PidParameters, sample_time: f64) -> Self {
        Self {
            params,
            sample_time,
        }
    }

    /// Calculate control output from the full history
    ///
    /// # Arguments
    /// * `history` - Every measured temperature so far, oldest first
    ///
    /// # Returns
    /// Actuator command in `[0, 100]`
    pub fn compute_output(&self, history: &[f64]) -> Result<f64, SimulationError> {
        compute_output(history, &self.params, self.sample_time)
    }
}

/// Incremental controller carrying the integral and the previous error
///
/// Fed the same samples in the same order, it reproduces
/// [`PidController::compute_output`] bit for bit: the integral is summed in
/// the same left-to-right order, only without revisiting old samples.
#[derive(Debug, Clone)]
pub struct RunningPidController {
    params: PidParameters,
    sample_time: f64,

    /// Accumulated Σ error*dt
    integral: f64,
    /// Error of the last observed sample
    previous_error: Option<f64>,
    /// Number of samples observed since the last reset
    samples: usize,
}

impl RunningPidController {
    pub fn new(params: PidParameters, sample_time: f64) -> Self {
        Self {
            params,
            sample_time,
            integral: 0.0,
            previous_error: None,
            samples: 0,
        }
    }

    /// Observe the next measurement and return the saturated output
    pub fn update(&mut self, measured: f64) -> f64 {
        self.update_terms(measured).output()
    }

    /// Observe the next measurement and return the unsaturated terms
    pub fn update_terms(&mut self, measured: f64) -> PidTerms {
        let error = measured - self.params.setpoint;

        self.integral += error * self.sample_time;

        let derivative_error = match self.previous_error {
            Some(previous) => (error - previous) / self.sample_time,
            None => 0.0,
        };

        self.previous_error = Some(error);
        self.samples += 1;

        PidTerms {
            proportional: self.params.kp * error,
            integral: self.params.ki * self.integral,
            derivative: self.params.kd * derivative_error,
        }
    }

    /// Forget all observed samples
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.previous_error = None;
        self.samples = 0;
    }

    /// Current Σ error*dt (useful for debugging)
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// Error of the last observed sample
    pub fn previous_error(&self) -> Option<f64> {
        self.previous_error
    }

    pub fn samples(&self) -> usize {
        self.samples
    }
}
