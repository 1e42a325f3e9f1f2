//! Calibration data reported by a backend.
//!
//! Only the per-qubit quantities a readout correction needs are kept:
//! the two assignment error rates, the symmetric readout error, and the
//! coherence times for display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{HalError, HalResult};

/// Assignment error rates of one qubit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReadoutError {
    /// P(measure 1 | prepared 0).
    pub prob_meas1_prep0: f64,
    /// P(measure 0 | prepared 1).
    pub prob_meas0_prep1: f64,
}

impl ReadoutError {
    /// Create readout error rates, each in `[0, 1]`.
    pub fn new(prob_meas1_prep0: f64, prob_meas0_prep1: f64) -> HalResult<Self> {
        for (name, p) in [
            ("prob_meas1_prep0", prob_meas1_prep0),
            ("prob_meas0_prep1", prob_meas0_prep1),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(HalError::Configuration(format!(
                    "{name} must lie in [0, 1], got {p}"
                )));
            }
        }
        Ok(Self {
            prob_meas1_prep0,
            prob_meas0_prep1,
        })
    }

    /// A perfect readout.
    pub fn ideal() -> Self {
        Self::default()
    }

    /// Mean assignment error.
    pub fn mean(&self) -> f64 {
        (self.prob_meas1_prep0 + self.prob_meas0_prep1) / 2.0
    }
}

/// Calibration data of one qubit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QubitProperties {
    /// T1 relaxation time in microseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t1_us: Option<f64>,
    /// T2 dephasing time in microseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t2_us: Option<f64>,
    /// Mean assignment error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readout_error: Option<f64>,
    /// P(measure 1 | prepared 0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prob_meas1_prep0: Option<f64>,
    /// P(measure 0 | prepared 1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prob_meas0_prep1: Option<f64>,
}

impl QubitProperties {
    /// Properties of a qubit with the given assignment error rates.
    pub fn with_readout(error: ReadoutError) -> Self {
        Self {
            readout_error: Some(error.mean()),
            prob_meas1_prep0: Some(error.prob_meas1_prep0),
            prob_meas0_prep1: Some(error.prob_meas0_prep1),
            ..Self::default()
        }
    }
}

/// Snapshot of a backend's calibration data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendProperties {
    /// Name of the backend the data belongs to.
    pub backend_name: String,
    /// When the calibration was taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
    /// Per-qubit data, indexed by physical qubit.
    pub qubits: Vec<QubitProperties>,
}

impl BackendProperties {
    /// Properties of a backend with perfect readout on every qubit.
    pub fn ideal(backend_name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            backend_name: backend_name.into(),
            last_update: None,
            qubits: vec![QubitProperties::with_readout(ReadoutError::ideal()); num_qubits as usize],
        }
    }

    /// Assignment error rates of `qubit`.
    ///
    /// When a backend reports only the mean readout error, both rates are
    /// taken to equal it.
    pub fn readout_error(&self, qubit: u32) -> HalResult<ReadoutError> {
        let props = self.qubits.get(qubit as usize).ok_or_else(|| {
            HalError::MissingProperty(format!(
                "{} reports no calibration for qubit {qubit}",
                self.backend_name
            ))
        })?;

        match (props.prob_meas1_prep0, props.prob_meas0_prep1, props.readout_error) {
            (Some(p01), Some(p10), _) => ReadoutError::new(p01, p10),
            (_, _, Some(mean)) => {
                warn!(
                    backend = %self.backend_name,
                    qubit,
                    mean,
                    "asymmetric readout rates missing, using mean readout error"
                );
                ReadoutError::new(mean, mean)
            }
            _ => Err(HalError::MissingProperty(format!(
                "{} reports no readout error for qubit {qubit}",
                self.backend_name
            ))),
        }
    }
}
