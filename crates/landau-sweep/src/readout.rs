//! Measurement statistics and readout correction.
//!
//! A readout channel is described by its confusion matrix
//!
//! ```text
//! A = [[1 - p01,   p10   ],
//!      [  p01,   1 - p10 ]]
//! ```
//!
//! with `p01 = P(meas 1 | prep 0)` and `p10 = P(meas 0 | prep 1)`. Column
//! `j` is the distribution of outcomes when `j` was prepared.

use landau_hal::{Counts, ReadoutError};
use serde::{Deserialize, Serialize};

use crate::error::{SweepError, SweepResult};

/// Determinants below this make the inverse correction meaningless.
const SINGULAR_DET: f64 = 1e-9;

/// `[P(0), P(1)]` of `target` from counts over a `num_qubits` register.
///
/// Every bitstring of the register, observed or not, lands in exactly one
/// of the two partitions by its bit at `target`; unobserved strings add
/// nothing, so only the observed keys are visited. Bit 0 is the rightmost
/// character. Probabilities are relative to `shots`, the number of shots
/// requested.
pub fn qubit_probabilities(
    counts: &Counts,
    target: u32,
    num_qubits: u32,
    shots: u32,
) -> SweepResult<[f64; 2]> {
    if target >= num_qubits {
        return Err(SweepError::Readout(format!(
            "target qubit {target} outside a {num_qubits}-qubit register"
        )));
    }
    if shots == 0 {
        return Err(SweepError::Readout("shot count must be positive".into()));
    }

    let width = num_qubits as usize;
    let position = width - 1 - target as usize;
    let mut tally = [0u64; 2];

    for (bitstring, count) in counts.iter() {
        let bytes = bitstring.as_bytes();
        if bytes.len() != width || !bytes.iter().all(|b| matches!(b, b'0' | b'1')) {
            return Err(SweepError::Readout(format!(
                "bitstring '{bitstring}' is not a {width}-bit binary string"
            )));
        }
        tally[usize::from(bytes[position] == b'1')] += count;
    }

    let shots = f64::from(shots);
    Ok([tally[0] as f64 / shots, tally[1] as f64 / shots])
}

/// 2x2 column-stochastic readout confusion matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// Row-major entries; `m[i][j] = P(meas i | prep j)`.
    pub m: [[f64; 2]; 2],
}

impl ConfusionMatrix {
    /// Build from the two assignment error rates, each in `[0, 1]`.
    pub fn from_rates(p01: f64, p10: f64) -> SweepResult<Self> {
        for (name, p) in [("prob_meas1_prep0", p01), ("prob_meas0_prep1", p10)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(SweepError::Readout(format!(
                    "{name} must lie in [0, 1], got {p}"
                )));
            }
        }
        Ok(Self {
            m: [[1.0 - p01, p10], [p01, 1.0 - p10]],
        })
    }

    /// Build from backend-reported rates.
    pub fn from_readout(error: ReadoutError) -> SweepResult<Self> {
        Self::from_rates(error.prob_meas1_prep0, error.prob_meas0_prep1)
    }

    /// Perfect readout.
    pub fn identity() -> Self {
        Self {
            m: [[1.0, 0.0], [0.0, 1.0]],
        }
    }

    /// `A · v`.
    pub fn apply(&self, v: [f64; 2]) -> [f64; 2] {
        let [[a, b], [c, d]] = self.m;
        [a * v[0] + b * v[1], c * v[0] + d * v[1]]
    }

    /// Determinant; `1 - p01 - p10`.
    pub fn determinant(&self) -> f64 {
        let [[a, b], [c, d]] = self.m;
        a * d - b * c
    }

    /// Sum of each column.
    pub fn column_sums(&self) -> [f64; 2] {
        let [[a, b], [c, d]] = self.m;
        [a + c, b + d]
    }

    /// `A⁻¹`, failing when the channel erases the outcome.
    pub fn inverse(&self) -> SweepResult<[[f64; 2]; 2]> {
        let det = self.determinant();
        if det.abs() < SINGULAR_DET {
            return Err(SweepError::Readout(format!(
                "confusion matrix is singular (det = {det:e})"
            )));
        }
        let [[a, b], [c, d]] = self.m;
        Ok([[d / det, -b / det], [-c / det, a / det]])
    }
}

/// How raw probabilities are corrected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalibrationMode {
    /// Left-multiply the confusion matrix into the raw vector.
    #[default]
    Forward,
    /// Left-multiply the inverse confusion matrix (unmixing).
    Inverse,
    /// Report raw probabilities unchanged.
    None,
}

impl CalibrationMode {
    /// Apply this correction to `raw` using `matrix`.
    pub fn correct(self, matrix: &ConfusionMatrix, raw: [f64; 2]) -> SweepResult<[f64; 2]> {
        match self {
            CalibrationMode::Forward => Ok(matrix.apply(raw)),
            CalibrationMode::Inverse => {
                let [[a, b], [c, d]] = matrix.inverse()?;
                Ok([a * raw[0] + b * raw[1], c * raw[0] + d * raw[1]])
            }
            CalibrationMode::None => Ok(raw),
        }
    }
}

impl std::fmt::Display for CalibrationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CalibrationMode::Forward => "forward",
            CalibrationMode::Inverse => "inverse",
            CalibrationMode::None => "none",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for CalibrationMode {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "forward" => Ok(CalibrationMode::Forward),
            "inverse" => Ok(CalibrationMode::Inverse),
            "none" => Ok(CalibrationMode::None),
            other => Err(SweepError::Config(format!(
                "unknown calibration mode '{other}' (expected forward, inverse, or none)"
            ))),
        }
    }
}
