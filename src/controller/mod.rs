pub mod pid;

pub use pid::{
    compute_output, compute_terms, PidController, PidTerms, RunningPidController, OUTPUT_MAX,
    OUTPUT_MIN,
};
