//! Error types for the QASM3 emitter.

use thiserror::Error;

/// Errors that can occur while emitting a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EmitError {
    /// A gate parameter is NaN or infinite.
    #[error("Gate '{gate}' has a non-finite parameter on qubit {qubit}")]
    NonFiniteParameter {
        /// Name of the offending gate.
        gate: String,
        /// Qubit the gate acts on.
        qubit: u32,
    },

    /// Instruction operands do not fit the instruction.
    #[error("Instruction '{name}' has invalid operands: {reason}")]
    InvalidOperands {
        /// Instruction name.
        name: String,
        /// What is wrong with the operands.
        reason: String,
    },
}

/// Result type for emit operations.
pub type EmitResult<T> = Result<T, EmitError>;
