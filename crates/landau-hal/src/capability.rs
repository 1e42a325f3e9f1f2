//! Backend capability introspection.

use serde::{Deserialize, Serialize};

/// Hardware capabilities of a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend.
    pub name: String,
    /// Number of qubits available.
    pub num_qubits: u32,
    /// Supported single-qubit gates (OpenQASM 3 naming).
    pub gate_set: GateSet,
    /// Maximum number of shots per job.
    pub max_shots: u32,
    /// Whether this is a simulator (`true`) or real hardware (`false`).
    pub is_simulator: bool,
    /// Additional capability flags such as `"statevector"` or `"readout_noise"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl Capabilities {
    /// Capabilities of the local statevector simulator.
    pub fn simulator(num_qubits: u32) -> Self {
        Self {
            name: "simulator".into(),
            num_qubits,
            gate_set: GateSet::universal(),
            max_shots: 1_000_000,
            is_simulator: true,
            features: vec!["statevector".into(), "initialize".into()],
        }
    }

    /// Capabilities of an IBM Quantum processor.
    pub fn ibm(name: impl Into<String>, num_qubits: u32, is_simulator: bool) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            gate_set: GateSet::ibm(),
            max_shots: 100_000,
            is_simulator,
            features: vec![],
        }
    }

    /// Add a feature flag.
    #[must_use]
    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.push(feature.into());
        self
    }

    /// Whether a feature flag is present.
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}

/// Gate set supported by a backend.
///
/// If `native` is empty every supported gate is native.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSet {
    /// Single-qubit gates supported.
    pub single_qubit: Vec<String>,
    /// Gates that execute without decomposition.
    pub native: Vec<String>,
}

impl GateSet {
    /// Single-qubit basis of IBM processors: `rz`, `sx`, `x`, `id`.
    pub fn ibm() -> Self {
        let basis: Vec<String> = ["rz", "sx", "x", "id"].map(String::from).to_vec();
        Self {
            single_qubit: basis.clone(),
            native: basis,
        }
    }

    /// Every gate the IR can express.
    pub fn universal() -> Self {
        Self {
            single_qubit: ["x", "h", "sx", "rz", "U", "unitary", "initialize"]
                .map(String::from)
                .to_vec(),
            native: vec![],
        }
    }

    /// Check if a gate is supported.
    pub fn contains(&self, gate: &str) -> bool {
        self.single_qubit.iter().any(|g| g == gate)
    }

    /// Check if a gate executes without decomposition.
    pub fn is_native(&self, gate: &str) -> bool {
        if self.native.is_empty() {
            self.contains(gate)
        } else {
            self.native.iter().any(|g| g == gate)
        }
    }
}
