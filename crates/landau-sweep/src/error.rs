//! Error types for sweep experiments.

use landau_hal::HalError;
use landau_ir::IrError;
use landau_sim::SimError;
use thiserror::Error;

/// Errors that can occur while running a sweep.
///
/// Backend communication, arithmetic, and circuit construction failures are
/// kept apart so callers can tell a dropped connection from a bad parameter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SweepError {
    /// The backend failed to accept, run, or report a job.
    #[error("Backend error: {0}")]
    Backend(#[from] HalError),

    /// Linear algebra or model parameter failure.
    #[error("Simulation error: {0}")]
    Simulation(#[from] SimError),

    /// The sweep circuit could not be built.
    #[error("Circuit error: {0}")]
    Circuit(#[from] IrError),

    /// Counts or calibration data cannot be turned into probabilities.
    #[error("Readout error: {0}")]
    Readout(String),

    /// Invalid or unreadable configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for sweep operations.
pub type SweepResult<T> = Result<T, SweepError>;
