//! High-level circuit builder API.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{Gate, StandardGate};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId};
use crate::unitary::{EPSILON, Unitary2x2};

/// Tolerance used when accepting user-supplied unitaries.
const UNITARY_TOLERANCE: f64 = 1e-8;

/// A quantum circuit over a fixed register of qubits and classical bits.
///
/// Instructions are kept in program order. Every gate acts on a single
/// qubit, so no dependency graph is needed to schedule them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    name: String,
    num_qubits: u32,
    num_clbits: u32,
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create a circuit with a given number of qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            num_clbits,
            instructions: vec![],
        }
    }

    fn check_qubit(&self, qubit: QubitId, gate_name: &str) -> IrResult<()> {
        if qubit.0 < self.num_qubits {
            Ok(())
        } else {
            Err(IrError::QubitNotFound {
                qubit,
                gate_name: Some(gate_name.to_string()),
            })
        }
    }

    fn check_clbit(&self, clbit: ClbitId, gate_name: &str) -> IrResult<()> {
        if clbit.0 < self.num_clbits {
            Ok(())
        } else {
            Err(IrError::ClbitNotFound {
                clbit,
                gate_name: Some(gate_name.to_string()),
            })
        }
    }

    fn apply_gate(&mut self, gate: Gate, qubit: QubitId) -> IrResult<&mut Self> {
        self.check_qubit(qubit, gate.name())?;
        self.instructions.push(Instruction::gate(gate, qubit));
        Ok(self)
    }

    // =========================================================================
    // State preparation
    // =========================================================================

    /// Prepare `qubit` in `state`, starting from |0⟩.
    ///
    /// The state is normalized before it is stored. Preparation must precede
    /// every other operation on the qubit (barriers excepted).
    pub fn initialize(&mut self, state: [Complex64; 2], qubit: QubitId) -> IrResult<&mut Self> {
        self.check_qubit(qubit, "initialize")?;

        let norm = (state[0].norm_sqr() + state[1].norm_sqr()).sqrt();
        if !norm.is_finite() || norm < EPSILON {
            return Err(IrError::InvalidState(format!(
                "amplitudes [{}, {}] cannot be normalized",
                state[0], state[1]
            )));
        }

        let touched = self.instructions.iter().any(|inst| {
            !matches!(inst.kind, InstructionKind::Barrier) && inst.qubits.contains(&qubit)
        });
        if touched {
            return Err(IrError::InitializeAfterOperation(qubit));
        }

        let normalized = [state[0] / norm, state[1] / norm];
        self.instructions
            .push(Instruction::initialize(normalized, qubit));
        Ok(self)
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply an arbitrary single-qubit unitary.
    pub fn unitary(
        &mut self,
        matrix: Unitary2x2,
        label: impl Into<String>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        let label = label.into();
        if !matrix.is_unitary(UNITARY_TOLERANCE) {
            return Err(IrError::NonUnitary(label));
        }
        self.apply_gate(Gate::unitary(matrix).with_label(label), qubit)
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_gate(StandardGate::H.into(), qubit)
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_gate(StandardGate::X.into(), qubit)
    }

    /// Apply sqrt(X) gate.
    pub fn sx(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_gate(StandardGate::SX.into(), qubit)
    }

    /// Apply Rz rotation gate.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply_gate(StandardGate::Rz(theta).into(), qubit)
    }

    // =========================================================================
    // Other operations
    // =========================================================================

    /// Apply a barrier across every qubit.
    pub fn barrier_all(&mut self) -> &mut Self {
        self.instructions
            .push(Instruction::barrier((0..self.num_qubits).map(QubitId)));
        self
    }

    /// Measure a qubit into a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.check_qubit(qubit, "measure")?;
        self.check_clbit(clbit, "measure")?;
        self.instructions.push(Instruction::measure(qubit, clbit));
        Ok(self)
    }

    /// Measure qubit `i` into classical bit `i` for every qubit.
    ///
    /// A circuit with no classical bits gets one per qubit.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        if self.num_clbits == 0 {
            self.num_clbits = self.num_qubits;
        }
        if self.num_clbits != self.num_qubits {
            return Err(IrError::MeasureSizeMismatch {
                qubits: self.num_qubits,
                clbits: self.num_clbits,
            });
        }
        for i in 0..self.num_qubits {
            self.instructions
                .push(Instruction::measure(QubitId(i), ClbitId(i)));
        }
        Ok(self)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits as usize
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.num_clbits as usize
    }

    /// Instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of operations, barriers excluded.
    pub fn num_ops(&self) -> usize {
        self.instructions
            .iter()
            .filter(|inst| !matches!(inst.kind, InstructionKind::Barrier))
            .count()
    }

    /// Number of gate instructions.
    pub fn gate_count(&self) -> usize {
        self.instructions
            .iter()
            .filter(|inst| inst.as_gate().is_some())
            .count()
    }

    /// Circuit depth: the longest chain of operations on any qubit.
    ///
    /// Barriers align the qubits they span without adding a layer.
    pub fn depth(&self) -> usize {
        let mut levels = vec![0usize; self.num_qubits()];
        for inst in &self.instructions {
            let current = inst
                .qubits
                .iter()
                .map(|q| levels[q.index()])
                .max()
                .unwrap_or(0);
            let next = match inst.kind {
                InstructionKind::Barrier => current,
                _ => current + 1,
            };
            for q in &inst.qubits {
                levels[q.index()] = next;
            }
        }
        levels.into_iter().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_build_sweep_shape() {
        let mut circuit = Circuit::with_size("lz", 1, 1);
        circuit
            .initialize([c(1.0, 0.0), c(-1.0, 0.0)], QubitId(0))
            .unwrap()
            .unitary(Unitary2x2::h(), "U_0", QubitId(0))
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap();

        assert_eq!(circuit.num_ops(), 3);
        assert_eq!(circuit.gate_count(), 1);
        assert_eq!(circuit.depth(), 3);
    }

    #[test]
    fn test_initialize_normalizes() {
        let mut circuit = Circuit::with_size("prep", 1, 0);
        circuit
            .initialize([c(3.0, 0.0), c(0.0, 4.0)], QubitId(0))
            .unwrap();
        match &circuit.instructions()[0].kind {
            InstructionKind::Initialize { state } => {
                assert!((state[0].re - 0.6).abs() < 1e-12);
                assert!((state[1].im - 0.8).abs() < 1e-12);
            }
            other => panic!("unexpected instruction {other:?}"),
        }
    }

    #[test]
    fn test_initialize_rejects_zero_state() {
        let mut circuit = Circuit::with_size("prep", 1, 0);
        let err = circuit
            .initialize([c(0.0, 0.0), c(0.0, 0.0)], QubitId(0))
            .unwrap_err();
        assert!(matches!(err, IrError::InvalidState(_)));
    }

    #[test]
    fn test_initialize_after_gate_rejected() {
        let mut circuit = Circuit::with_size("prep", 2, 0);
        circuit.x(QubitId(0)).unwrap();
        circuit.barrier_all();
        // Other qubits are still fresh.
        circuit
            .initialize([c(1.0, 0.0), c(0.0, 0.0)], QubitId(1))
            .unwrap();
        let err = circuit
            .initialize([c(1.0, 0.0), c(0.0, 0.0)], QubitId(0))
            .unwrap_err();
        assert!(matches!(err, IrError::InitializeAfterOperation(QubitId(0))));
    }

    #[test]
    fn test_non_unitary_rejected() {
        let mut circuit = Circuit::with_size("bad", 1, 0);
        let m = Unitary2x2::new(c(2.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(1.0, 0.0));
        let err = circuit.unitary(m, "scale", QubitId(0)).unwrap_err();
        assert!(matches!(err, IrError::NonUnitary(ref name) if name == "scale"));
    }

    #[test]
    fn test_out_of_range_qubit() {
        let mut circuit = Circuit::with_size("small", 1, 1);
        let err = circuit.h(QubitId(1)).unwrap_err();
        assert!(matches!(err, IrError::QubitNotFound { .. }));
        let err = circuit.measure(QubitId(0), ClbitId(3)).unwrap_err();
        assert!(matches!(err, IrError::ClbitNotFound { .. }));
    }

    #[test]
    fn test_measure_all_allocates_clbits() {
        let mut circuit = Circuit::with_size("m", 3, 0);
        circuit.measure_all().unwrap();
        assert_eq!(circuit.num_clbits(), 3);
        assert_eq!(circuit.num_ops(), 3);
        assert_eq!(circuit.depth(), 1);

        let mut mismatched = Circuit::with_size("m", 3, 2);
        assert!(mismatched.measure_all().is_err());
    }

    #[test]
    fn test_depth_with_barrier() {
        let mut circuit = Circuit::with_size("d", 2, 0);
        circuit.h(QubitId(0)).unwrap().h(QubitId(0)).unwrap();
        circuit.barrier_all();
        circuit.x(QubitId(1)).unwrap();
        assert_eq!(circuit.depth(), 3);
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut circuit = Circuit::with_size("json", 1, 1);
        circuit.sx(QubitId(0)).unwrap().rz(0.5, QubitId(0)).unwrap();
        circuit.measure_all().unwrap();
        let json = serde_json::to_string(&circuit).unwrap();
        let back: Circuit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, circuit);
    }
}
