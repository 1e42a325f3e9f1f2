//! Error types for the IR crate.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit not found in circuit.
    #[error("Qubit {qubit} not found in circuit{}", format_gate_context(.gate_name))]
    QubitNotFound {
        /// The qubit that was not found.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Classical bit not found in circuit.
    #[error("Classical bit {clbit} not found in circuit{}", format_gate_context(.gate_name))]
    ClbitNotFound {
        /// The classical bit that was not found.
        clbit: ClbitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// State preparation placed after another operation on the same qubit.
    #[error("Cannot initialize {0}: qubit already has operations applied")]
    InitializeAfterOperation(QubitId),

    /// State vector that cannot be prepared.
    #[error("Invalid state vector: {0}")]
    InvalidState(String),

    /// Matrix is not unitary within tolerance.
    #[error("Gate '{0}' is not unitary")]
    NonUnitary(String),

    /// Register sizes do not allow a one-to-one measurement.
    #[error("Cannot measure {qubits} qubits into {clbits} classical bits")]
    MeasureSizeMismatch {
        /// Number of qubits in the circuit.
        qubits: u32,
        /// Number of classical bits in the circuit.
        clbits: u32,
    },
}

/// Helper function to format optional gate context.
#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
