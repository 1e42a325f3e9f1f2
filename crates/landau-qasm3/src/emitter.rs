//! QASM3 emitter for serializing circuits.

use std::f64::consts::PI;

use landau_ir::{
    Circuit, ClbitId, GateKind, Instruction, InstructionKind, QubitId, StandardGate, Unitary2x2,
    normalize_angle,
};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{EmitError, EmitResult};

/// Angles below this are treated as zero when simplifying.
const ANGLE_EPSILON: f64 = 1e-12;

/// Gate set the emitted program is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateBasis {
    /// Arbitrary unitaries become the built-in `U(θ, φ, λ)` gate.
    #[default]
    Universal,
    /// Only `rz`, `sx` and `x`, the single-qubit basis of IBM devices.
    Native,
}

/// Emit a circuit as QASM3 source code.
pub fn emit(circuit: &Circuit, basis: GateBasis) -> EmitResult<String> {
    let mut emitter = Emitter::new(basis);
    emitter.emit_circuit(circuit)
}

/// Express a single-qubit unitary in the `rz`/`sx` basis.
///
/// Gates are returned in application order. The product matches `matrix`
/// up to a global phase.
pub fn native_sequence(matrix: &Unitary2x2) -> Vec<StandardGate> {
    let angles = matrix.u_angles();
    native_u(angles.theta, angles.phi, angles.lambda)
}

/// `U(θ, φ, λ) ≅ rz(φ + π) · sx · rz(θ + π) · sx · rz(λ)`.
fn native_u(theta: f64, phi: f64, lambda: f64) -> Vec<StandardGate> {
    let raw = if (theta / 2.0).sin().abs() < ANGLE_EPSILON {
        vec![StandardGate::Rz(phi + lambda)]
    } else {
        vec![
            StandardGate::Rz(lambda),
            StandardGate::SX,
            StandardGate::Rz(theta + PI),
            StandardGate::SX,
            StandardGate::Rz(phi + PI),
        ]
    };

    raw.into_iter()
        .filter_map(|gate| match gate {
            StandardGate::Rz(angle) => {
                let angle = normalize_angle(angle);
                (angle.abs() > ANGLE_EPSILON).then_some(StandardGate::Rz(angle))
            }
            other => Some(other),
        })
        .collect()
}

/// Angles of the `U(θ, φ, 0)` gate taking |0⟩ to `state`.
fn preparation_angles(state: [Complex64; 2]) -> (f64, f64) {
    let [a, b] = state;
    let theta = 2.0 * b.norm().atan2(a.norm());
    let phi = normalize_angle(b.arg() - a.arg());
    (theta, phi)
}

/// QASM3 emitter.
struct Emitter {
    output: String,
    basis: GateBasis,
}

impl Emitter {
    fn new(basis: GateBasis) -> Self {
        Self {
            output: String::new(),
            basis,
        }
    }

    fn emit_circuit(&mut self, circuit: &Circuit) -> EmitResult<String> {
        self.writeln("OPENQASM 3.0;");
        self.writeln("include \"stdgates.inc\";");
        self.writeln("");

        let num_qubits = circuit.num_qubits();
        if num_qubits > 0 {
            self.writeln(&format!("qubit[{num_qubits}] q;"));
        }
        let num_clbits = circuit.num_clbits();
        if num_clbits > 0 {
            self.writeln(&format!("bit[{num_clbits}] c;"));
        }
        if num_qubits > 0 || num_clbits > 0 {
            self.writeln("");
        }

        for instruction in circuit.instructions() {
            self.emit_instruction(instruction)?;
        }

        Ok(std::mem::take(&mut self.output))
    }

    fn emit_instruction(&mut self, instruction: &Instruction) -> EmitResult<()> {
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let qubit = single_qubit(instruction)?;
                match &gate.kind {
                    GateKind::Standard(std) => self.emit_standard(*std, qubit)?,
                    GateKind::Unitary(matrix) => {
                        if !matrix.is_finite() {
                            return Err(EmitError::NonFiniteParameter {
                                gate: gate.label.clone().unwrap_or_else(|| "unitary".into()),
                                qubit: qubit.0,
                            });
                        }
                        self.emit_matrix(matrix, qubit)?;
                    }
                }
            }

            InstructionKind::Initialize { state } => {
                let qubit = single_qubit(instruction)?;
                self.writeln(&format!("reset q[{}];", qubit.0));
                let (theta, phi) = preparation_angles(*state);
                self.emit_u(theta, phi, 0.0, qubit)?;
            }

            InstructionKind::Measure => {
                if instruction.qubits.len() != instruction.clbits.len() {
                    return Err(EmitError::InvalidOperands {
                        name: "measure".into(),
                        reason: format!(
                            "{} qubits but {} classical bits",
                            instruction.qubits.len(),
                            instruction.clbits.len()
                        ),
                    });
                }
                for (q, c) in instruction.qubits.iter().zip(&instruction.clbits) {
                    self.writeln(&format!("{} = measure {};", clbit_ref(*c), qubit_ref(*q)));
                }
            }

            InstructionKind::Barrier => {
                let qubits = instruction
                    .qubits
                    .iter()
                    .map(|q| qubit_ref(*q))
                    .collect::<Vec<_>>()
                    .join(", ");
                if qubits.is_empty() {
                    self.writeln("barrier;");
                } else {
                    self.writeln(&format!("barrier {qubits};"));
                }
            }
        }

        Ok(())
    }

    fn emit_standard(&mut self, gate: StandardGate, qubit: QubitId) -> EmitResult<()> {
        if gate.parameters().iter().any(|p| !p.is_finite()) {
            return Err(EmitError::NonFiniteParameter {
                gate: gate.name().into(),
                qubit: qubit.0,
            });
        }
        match (self.basis, gate) {
            (_, StandardGate::X | StandardGate::SX | StandardGate::Rz(_)) => {
                self.emit_gate(gate, qubit);
            }
            (GateBasis::Universal, _) => self.emit_gate(gate, qubit),
            (GateBasis::Native, _) => self.emit_matrix(&gate.matrix(), qubit)?,
        }
        Ok(())
    }

    fn emit_matrix(&mut self, matrix: &Unitary2x2, qubit: QubitId) -> EmitResult<()> {
        let angles = matrix.u_angles();
        self.emit_u(angles.theta, angles.phi, angles.lambda, qubit)
    }

    fn emit_u(&mut self, theta: f64, phi: f64, lambda: f64, qubit: QubitId) -> EmitResult<()> {
        if ![theta, phi, lambda].iter().all(|p| p.is_finite()) {
            return Err(EmitError::NonFiniteParameter {
                gate: "U".into(),
                qubit: qubit.0,
            });
        }
        match self.basis {
            GateBasis::Universal => self.emit_gate(StandardGate::U(theta, phi, lambda), qubit),
            GateBasis::Native => {
                for gate in native_u(theta, phi, lambda) {
                    self.emit_gate(gate, qubit);
                }
            }
        }
        Ok(())
    }

    fn emit_gate(&mut self, gate: StandardGate, qubit: QubitId) {
        let params = gate.parameters();
        if params.is_empty() {
            self.writeln(&format!("{} {};", gate.name(), qubit_ref(qubit)));
        } else {
            let params = params
                .iter()
                .map(|p| format_param(*p))
                .collect::<Vec<_>>()
                .join(", ");
            self.writeln(&format!("{}({params}) {};", gate.name(), qubit_ref(qubit)));
        }
    }

    fn writeln(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }
}

fn single_qubit(instruction: &Instruction) -> EmitResult<QubitId> {
    match instruction.qubits.as_slice() {
        [q] => Ok(*q),
        other => Err(EmitError::InvalidOperands {
            name: instruction.name().to_string(),
            reason: format!("expected 1 qubit, got {}", other.len()),
        }),
    }
}

fn qubit_ref(q: QubitId) -> String {
    format!("q[{}]", q.0)
}

fn clbit_ref(c: ClbitId) -> String {
    format!("c[{}]", c.0)
}

/// Format an angle, snapping common fractions of pi.
fn format_param(v: f64) -> String {
    const FRACTIONS: [(f64, &str); 6] = [
        (PI, "pi"),
        (-PI, "-pi"),
        (PI / 2.0, "pi/2"),
        (-PI / 2.0, "-pi/2"),
        (PI / 4.0, "pi/4"),
        (-PI / 4.0, "-pi/4"),
    ];
    if v.abs() < ANGLE_EPSILON {
        return "0".into();
    }
    for (value, text) in FRACTIONS {
        if (v - value).abs() < 1e-10 {
            return text.into();
        }
    }
    format!("{v}")
}
