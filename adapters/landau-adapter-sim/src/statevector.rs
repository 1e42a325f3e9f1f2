//! Statevector simulation engine.

use num_complex::Complex64;

use landau_ir::{Instruction, InstructionKind, Unitary2x2};

/// Amplitudes of an n-qubit register; bit `q` of an index is qubit `q`.
pub struct Statevector {
    amplitudes: Vec<Complex64>,
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Apply an instruction. Measurements and barriers leave the state as is.
    pub fn apply(&mut self, instruction: &Instruction) {
        let Some(qubit) = instruction.qubits.first().map(|q| q.index()) else {
            return;
        };
        match &instruction.kind {
            InstructionKind::Gate(gate) => self.apply_matrix(qubit, &gate.matrix()),
            // The qubit is still in |0⟩, so preparation is a single rotation.
            InstructionKind::Initialize { state } => {
                self.apply_matrix(qubit, &Unitary2x2::preparing(*state));
            }
            InstructionKind::Measure | InstructionKind::Barrier => {}
        }
    }

    /// Apply a single-qubit matrix to `qubit`.
    pub fn apply_matrix(&mut self, qubit: usize, matrix: &Unitary2x2) {
        let mask = 1 << qubit;
        let [a, b, c, d] = matrix.data;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let (x0, x1) = (self.amplitudes[i], self.amplitudes[j]);
                self.amplitudes[i] = a * x0 + b * x1;
                self.amplitudes[j] = c * x0 + d * x1;
            }
        }
    }

    /// Born-rule probability of each basis index.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use landau_ir::{QubitId, StandardGate};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new(2);
        assert_eq!(sv.num_qubits(), 2);
        assert_eq!(sv.probabilities(), vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_x_on_second_qubit_sets_bit_one() {
        let mut sv = Statevector::new(2);
        sv.apply(&Instruction::gate(StandardGate::X, QubitId(1)));
        let p = sv.probabilities();
        assert!(approx(p[0b10], 1.0));
    }

    #[test]
    fn test_initialize_prepares_state() {
        let mut sv = Statevector::new(1);
        let state = [Complex64::new(0.6, 0.0), Complex64::new(0.0, 0.8)];
        sv.apply(&Instruction::initialize(state, QubitId(0)));
        let p = sv.probabilities();
        assert!(approx(p[0], 0.36));
        assert!(approx(p[1], 0.64));
    }

    #[test]
    fn test_measure_is_noop() {
        let mut sv = Statevector::new(1);
        sv.apply(&Instruction::gate(StandardGate::H, QubitId(0)));
        let before = sv.probabilities();
        sv.apply(&Instruction::measure(QubitId(0), landau_ir::ClbitId(0)));
        assert_eq!(before, sv.probabilities());
    }
}
