//! Sweep results.

use landau_hal::ReadoutError;
use serde::{Deserialize, Serialize};

use crate::readout::CalibrationMode;

/// Measurements at one grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Grid index.
    pub index: usize,
    /// Physical time reached.
    pub time: f64,
    /// Step operators applied.
    pub steps: usize,
    /// Backend job that measured this point.
    pub job_id: String,
    /// `[P(0), P(1)]` from counts.
    pub raw: [f64; 2],
    /// `raw` after readout correction.
    pub calibrated: [f64; 2],
    /// Noiseless reference from classical propagation.
    pub ideal: [f64; 2],
    /// Backend-reported execution time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
}

/// Outcome of a full sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Backend the jobs ran on.
    pub backend: String,
    /// τ.
    pub annealing_time: f64,
    /// Δ.
    pub gap: f64,
    /// Register width.
    pub num_qubits: u32,
    /// Measured qubit.
    pub target: u32,
    /// Shots per job.
    pub shots: u32,
    /// Correction applied to raw probabilities.
    pub calibration: CalibrationMode,
    /// Readout rates of the target qubit; absent when no correction ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readout: Option<ReadoutError>,
    /// Asymptotic probability of staying diabatic, `exp(-π Δ² τ / 2)`.
    pub diabatic_probability: f64,
    /// One entry per grid point, in time order.
    pub points: Vec<SweepPoint>,
}

impl SweepReport {
    /// Raw probability pairs in time order.
    pub fn raw_sequence(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(|p| p.raw).collect()
    }

    /// Calibrated probability pairs in time order.
    pub fn calibrated_sequence(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(|p| p.calibrated).collect()
    }

    /// Noiseless probability pairs in time order.
    pub fn ideal_sequence(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(|p| p.ideal).collect()
    }

    /// Largest `|calibrated P(1) - ideal P(1)|` over the sweep.
    pub fn max_deviation(&self) -> f64 {
        self.points
            .iter()
            .map(|p| (p.calibrated[1] - p.ideal[1]).abs())
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(index: usize, calibrated: f64, ideal: f64) -> SweepPoint {
        SweepPoint {
            index,
            time: index as f64,
            steps: index * 5,
            job_id: format!("job-{index}"),
            raw: [1.0 - calibrated, calibrated],
            calibrated: [1.0 - calibrated, calibrated],
            ideal: [1.0 - ideal, ideal],
            execution_time_ms: None,
        }
    }

    fn report() -> SweepReport {
        SweepReport {
            backend: "simulator".into(),
            annealing_time: 1.0,
            gap: 1.0,
            num_qubits: 1,
            target: 0,
            shots: 100,
            calibration: CalibrationMode::None,
            readout: None,
            diabatic_probability: (-std::f64::consts::PI / 2.0).exp(),
            points: vec![point(0, 0.1, 0.1), point(1, 0.5, 0.3)],
        }
    }

    #[test]
    fn test_sequences_keep_order() {
        let r = report();
        assert_eq!(r.raw_sequence()[1], [0.5, 0.5]);
        assert_eq!(r.ideal_sequence().len(), 2);
        assert!((r.max_deviation() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(report()).unwrap();
        assert_eq!(json["calibration"], "none");
        assert!(json.get("readout").is_none());
        assert_eq!(json["points"][1]["job_id"], "job-1");
        assert!(json["points"][0].get("execution_time_ms").is_none());
    }
}
