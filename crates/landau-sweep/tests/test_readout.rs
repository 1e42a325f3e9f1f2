//! Probability extraction and calibration through the public API.

use landau_hal::Counts;
use landau_sweep::{CalibrationMode, ConfusionMatrix, SweepConfig, qubit_probabilities};
use proptest::prelude::*;

#[test]
fn test_all_zero_string_every_target() {
    for n in 1..=4u32 {
        let counts = Counts::from_pairs([("0".repeat(n as usize), 5000)]);
        for target in 0..n {
            assert_eq!(
                qubit_probabilities(&counts, target, n, 5000).unwrap(),
                [1.0, 0.0]
            );
        }
    }
}

#[test]
fn test_config_file_drives_calibration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sweep.yaml");
    std::fs::write(&path, "calibration: none\nshots: 100\n").unwrap();

    let config = SweepConfig::from_file(&path).unwrap();
    assert_eq!(config.calibration, CalibrationMode::None);
    assert_eq!(config.shots, 100);

    assert!(SweepConfig::from_file(dir.path().join("missing.yaml")).is_err());
}

fn counts_over(n: usize) -> impl Strategy<Value = Vec<(String, u64)>> {
    prop::collection::vec(
        (prop::collection::vec(prop::bool::ANY, n), 1u64..500),
        0..8,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .map(|(bits, count)| {
                let s: String = bits.iter().map(|&b| if b { '1' } else { '0' }).collect();
                (s, count)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_partitions_cover_all_shots(pairs in counts_over(3), target in 0u32..3) {
        let counts = Counts::from_pairs(pairs);
        let total = counts.total_shots().max(1);
        let shots = u32::try_from(total).unwrap();
        let [p0, p1] = qubit_probabilities(&counts, target, 3, shots).unwrap();
        prop_assert!((p0 + p1 - counts.total_shots() as f64 / f64::from(shots)).abs() < 1e-12);
    }

    #[test]
    fn prop_columns_sum_to_one(p01 in 0.0f64..=1.0, p10 in 0.0f64..=1.0) {
        let [c0, c1] = ConfusionMatrix::from_rates(p01, p10).unwrap().column_sums();
        prop_assert!((c0 - 1.0).abs() < 1e-12);
        prop_assert!((c1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn prop_none_mode_is_identity(p in 0.0f64..=1.0, p01 in 0.0f64..=1.0, p10 in 0.0f64..=1.0) {
        let a = ConfusionMatrix::from_rates(p01, p10).unwrap();
        prop_assert_eq!(CalibrationMode::None.correct(&a, [p, 1.0 - p]).unwrap(), [p, 1.0 - p]);
    }
}
