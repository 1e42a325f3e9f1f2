//! Error types for the sim crate.

use thiserror::Error;

/// Errors produced by Hamiltonian evaluation and time-evolution synthesis.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// A model or schedule parameter is out of range.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// Matrix is not square.
    #[error("Expected a square matrix, got {rows}x{cols}")]
    NotSquare {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },

    /// Matrix is not Hermitian.
    #[error("Matrix is not Hermitian: {0}")]
    NotHermitian(String),

    /// The two eigenvalues coincide, so the ground state is not unique.
    #[error("Degenerate spectrum: eigenvalues coincide at {value}")]
    DegenerateSpectrum {
        /// The shared eigenvalue.
        value: f64,
    },

    /// Linear solve hit a singular matrix.
    #[error("Singular matrix in linear solve")]
    SingularMatrix,

    /// A step operator failed the unitarity check.
    #[error("Step {step} at t = {time} is not unitary")]
    NonUnitary {
        /// Step index.
        step: usize,
        /// Sample time of the step.
        time: f64,
    },

    /// Grid point beyond the schedule.
    #[error("Grid point {point} out of range for a schedule of {points} points")]
    PointOutOfRange {
        /// Requested point.
        point: usize,
        /// Number of points in the schedule.
        points: usize,
    },

    /// Circuit builder returned an error.
    #[error("Circuit IR error: {0}")]
    Ir(#[from] landau_ir::IrError),
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
