use thiserror::Error;

/// Errors raised by the simulation core
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// The run cannot start with these parameters or this placement
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The update rule produced a corrupted road
    #[error("Invariant violated at step {step}: {reason}")]
    InvariantViolation { step: u64, reason: String },
}
