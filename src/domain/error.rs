use thiserror::Error;

/// Errors that can abort a simulation run
///
/// Every variant is reported before or instead of a result; a failed run
/// never surfaces partial series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("PID output requires at least one measured sample")]
    InsufficientHistory,

    #[error("Simulation cancelled after {completed_steps} steps")]
    Cancelled { completed_steps: usize },
}

impl SimulationError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        SimulationError::InvalidConfiguration(message.into())
    }

    /// Short machine-readable name, used as a log field
    pub fn kind(&self) -> &'static str {
        match self {
            SimulationError::InvalidConfiguration(_) => "InvalidConfiguration",
            SimulationError::InsufficientHistory => "InsufficientHistory",
            SimulationError::Cancelled { .. } => "Cancelled",
        }
    }
}

impl From<validator::ValidationErrors> for SimulationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        SimulationError::InvalidConfiguration(errors.to_string())
    }
}
