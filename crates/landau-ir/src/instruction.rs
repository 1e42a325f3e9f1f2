//! Circuit instructions combining gates with operands.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::gate::Gate;
use crate::qubit::{ClbitId, QubitId};

/// The kind of instruction in a circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// A unitary gate.
    Gate(Gate),
    /// Prepare a qubit (from |0⟩) in the given normalized state.
    Initialize {
        /// Amplitudes of |0⟩ and |1⟩.
        state: [Complex64; 2],
    },
    /// Measurement in the computational basis.
    Measure,
    /// Barrier (synchronization point).
    Barrier,
}

/// A complete instruction with operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The kind of instruction.
    pub kind: InstructionKind,
    /// Qubits this instruction operates on.
    pub qubits: Vec<QubitId>,
    /// Classical bits this instruction writes (measure only).
    pub clbits: Vec<ClbitId>,
}

impl Instruction {
    /// Create a single-qubit gate instruction.
    pub fn gate(gate: impl Into<Gate>, qubit: QubitId) -> Self {
        Self {
            kind: InstructionKind::Gate(gate.into()),
            qubits: vec![qubit],
            clbits: vec![],
        }
    }

    /// Create a state-preparation instruction.
    pub fn initialize(state: [Complex64; 2], qubit: QubitId) -> Self {
        Self {
            kind: InstructionKind::Initialize { state },
            qubits: vec![qubit],
            clbits: vec![],
        }
    }

    /// Create a measurement instruction.
    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        Self {
            kind: InstructionKind::Measure,
            qubits: vec![qubit],
            clbits: vec![clbit],
        }
    }

    /// Create a barrier instruction.
    pub fn barrier(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Barrier,
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    /// Get the gate if this is a gate instruction.
    pub fn as_gate(&self) -> Option<&Gate> {
        match &self.kind {
            InstructionKind::Gate(g) => Some(g),
            _ => None,
        }
    }

    /// Check if this is a measurement.
    pub fn is_measure(&self) -> bool {
        matches!(self.kind, InstructionKind::Measure)
    }

    /// Get the name of this instruction.
    pub fn name(&self) -> &str {
        match &self.kind {
            InstructionKind::Gate(g) => g.name(),
            InstructionKind::Initialize { .. } => "initialize",
            InstructionKind::Measure => "measure",
            InstructionKind::Barrier => "barrier",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::StandardGate;

    #[test]
    fn test_instruction_names() {
        let h = Instruction::gate(StandardGate::H, QubitId(0));
        assert_eq!(h.name(), "h");
        assert!(h.as_gate().is_some());

        let m = Instruction::measure(QubitId(0), ClbitId(0));
        assert!(m.is_measure());
        assert_eq!(m.clbits, vec![ClbitId(0)]);

        let init = Instruction::initialize(
            [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
            QubitId(1),
        );
        assert_eq!(init.name(), "initialize");
        assert!(init.as_gate().is_none());
    }
}
