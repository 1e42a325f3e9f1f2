//! Quantum gate types.

use serde::{Deserialize, Serialize};

use crate::unitary::Unitary2x2;

/// Standard single-qubit gates with known semantics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    /// Pauli-X gate.
    X,
    /// Hadamard gate.
    H,
    /// sqrt(X) gate.
    SX,
    /// Rotation around Z axis.
    Rz(f64),
    /// Universal single-qubit gate U(θ, φ, λ).
    U(f64, f64, f64),
}

impl StandardGate {
    /// Get the OpenQASM name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::X => "x",
            StandardGate::H => "h",
            StandardGate::SX => "sx",
            StandardGate::Rz(_) => "rz",
            StandardGate::U(_, _, _) => "U",
        }
    }

    /// Get the gate parameters in declaration order.
    pub fn parameters(&self) -> Vec<f64> {
        match self {
            StandardGate::Rz(theta) => vec![*theta],
            StandardGate::U(theta, phi, lambda) => vec![*theta, *phi, *lambda],
            _ => vec![],
        }
    }

    /// The matrix this gate implements.
    pub fn matrix(&self) -> Unitary2x2 {
        match *self {
            StandardGate::X => Unitary2x2::x(),
            StandardGate::H => Unitary2x2::h(),
            StandardGate::SX => Unitary2x2::sx(),
            StandardGate::Rz(theta) => Unitary2x2::rz(theta),
            StandardGate::U(theta, phi, lambda) => Unitary2x2::u(theta, phi, lambda),
        }
    }
}

/// A gate, either standard or given directly by its matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateKind {
    /// A standard gate with known semantics.
    Standard(StandardGate),
    /// An arbitrary single-qubit unitary.
    Unitary(Unitary2x2),
}

impl GateKind {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            GateKind::Standard(g) => g.name(),
            GateKind::Unitary(_) => "unitary",
        }
    }

    /// The matrix this gate implements.
    pub fn matrix(&self) -> Unitary2x2 {
        match self {
            GateKind::Standard(g) => g.matrix(),
            GateKind::Unitary(m) => *m,
        }
    }
}

/// A gate with associated metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// The kind of gate.
    pub kind: GateKind,
    /// Optional label for the gate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Gate {
    /// Create a new gate from a standard gate.
    pub fn standard(gate: StandardGate) -> Self {
        Self {
            kind: GateKind::Standard(gate),
            label: None,
        }
    }

    /// Create a new gate from a unitary matrix.
    pub fn unitary(matrix: Unitary2x2) -> Self {
        Self {
            kind: GateKind::Unitary(matrix),
            label: None,
        }
    }

    /// Add a label to the gate.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the name of this gate.
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// The matrix this gate implements.
    pub fn matrix(&self) -> Unitary2x2 {
        self.kind.matrix()
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::standard(gate)
    }
}

impl From<Unitary2x2> for Gate {
    fn from(matrix: Unitary2x2) -> Self {
        Gate::unitary(matrix)
    }
}
