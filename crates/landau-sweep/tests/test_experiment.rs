//! End-to-end sweeps against the local simulator.

use landau_adapter_sim::SimulatorBackend;
use landau_hal::{HalError, ReadoutError};
use landau_sweep::{CalibrationMode, ConfusionMatrix, SweepConfig, SweepError, run_sweep, run_sweep_with};

const TOL: f64 = 0.03;

fn single_point(t_start: f64) -> SweepConfig {
    let mut config = SweepConfig::default();
    config.schedule.t_start = t_start;
    config.schedule.points = 1;
    config.calibration = CalibrationMode::None;
    config
}

#[tokio::test]
async fn test_zero_steps_measures_ground_state() {
    let backend = SimulatorBackend::new().with_seed(2024);
    let report = run_sweep(&backend, &single_point(0.0)).await.unwrap();

    assert_eq!(report.points.len(), 1);
    let point = &report.points[0];
    assert_eq!(point.steps, 0);
    // (|0⟩ - |1⟩)/√2 at the crossing.
    assert!((point.ideal[1] - 0.5).abs() < 1e-12);
    assert!((point.raw[1] - 0.5).abs() < TOL, "raw = {:?}", point.raw);
    assert!((point.raw[0] + point.raw[1] - 1.0).abs() < 1e-12);
    assert_eq!(point.calibrated, point.raw);
}

#[tokio::test]
async fn test_default_sweep_tracks_ideal() {
    let backend = SimulatorBackend::new().with_seed(99);
    let report = run_sweep(&backend, &SweepConfig::default()).await.unwrap();

    assert_eq!(report.points.len(), 5);
    let steps: Vec<usize> = report.points.iter().map(|p| p.steps).collect();
    assert_eq!(steps, vec![0, 5, 10, 15, 20]);
    let times: Vec<f64> = report.points.iter().map(|p| p.time).collect();
    assert_eq!(times, vec![-10.0, -5.0, 0.0, 5.0, 10.0]);

    for point in &report.points {
        assert!(
            (point.raw[1] - point.ideal[1]).abs() < TOL,
            "point {}: raw {:?} ideal {:?}",
            point.index,
            point.raw,
            point.ideal
        );
    }
    // Ideal readout: forward correction is the identity.
    assert_eq!(report.readout, Some(ReadoutError::ideal()));
    assert_eq!(report.calibrated_sequence(), report.raw_sequence());
    assert!((report.diabatic_probability - (-std::f64::consts::PI / 2.0).exp()).abs() < 1e-12);
}

#[tokio::test]
async fn test_job_ids_are_distinct() {
    let backend = SimulatorBackend::new().with_seed(5);
    let report = run_sweep(&backend, &SweepConfig::default()).await.unwrap();
    let mut ids: Vec<&str> = report.points.iter().map(|p| p.job_id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), report.points.len());
}

#[tokio::test]
async fn test_forward_calibration_uses_reported_rates() {
    let error = ReadoutError::new(0.1, 0.2).unwrap();
    let backend = SimulatorBackend::new()
        .with_seed(17)
        .with_readout_error(error);
    let mut config = single_point(-10.0);
    config.calibration = CalibrationMode::Forward;

    let report = run_sweep(&backend, &config).await.unwrap();
    assert_eq!(report.readout, Some(error));

    let point = &report.points[0];
    let expected = ConfusionMatrix::from_rates(0.1, 0.2).unwrap().apply(point.raw);
    assert_eq!(point.calibrated, expected);
}

#[tokio::test]
async fn test_inverse_calibration_removes_readout_noise() {
    let backend = SimulatorBackend::new()
        .with_seed(31)
        .with_readout_error(ReadoutError::new(0.1, 0.2).unwrap());
    let mut config = single_point(-10.0);
    config.shots = 20_000;

    config.calibration = CalibrationMode::None;
    let noisy = run_sweep(&backend, &config).await.unwrap();
    let point = &noisy.points[0];
    // Almost all |0⟩, so about 10% of shots flip to 1.
    assert!((point.raw[1] - 0.1).abs() < TOL, "raw = {:?}", point.raw);

    config.calibration = CalibrationMode::Inverse;
    let corrected = run_sweep(&backend, &config).await.unwrap();
    let point = &corrected.points[0];
    assert!(
        (point.calibrated[1] - point.ideal[1]).abs() < TOL,
        "calibrated {:?} ideal {:?}",
        point.calibrated,
        point.ideal
    );
}

#[tokio::test]
async fn test_wide_register_measures_target() {
    let backend = SimulatorBackend::new().with_seed(8);
    let mut config = single_point(0.0);
    config.register.num_qubits = 3;
    config.register.target = 2;

    let report = run_sweep(&backend, &config).await.unwrap();
    assert_eq!(report.num_qubits, 3);
    assert!((report.points[0].raw[1] - 0.5).abs() < TOL);
}

#[tokio::test]
async fn test_callback_sees_every_point() {
    let backend = SimulatorBackend::new().with_seed(1);
    let mut seen = Vec::new();
    run_sweep_with(&backend, &SweepConfig::default(), |p| seen.push(p.index))
        .await
        .unwrap();
    assert_eq!(seen, vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn test_backend_rejection_aborts_sweep() {
    let backend = SimulatorBackend::with_max_qubits(1);
    let mut config = single_point(0.0);
    config.register.num_qubits = 2;

    let err = run_sweep(&backend, &config).await.unwrap_err();
    assert!(matches!(
        err,
        SweepError::Backend(HalError::CircuitTooLarge(_))
    ));
}

#[tokio::test]
async fn test_invalid_config_rejected_before_submission() {
    let backend = SimulatorBackend::new();
    let mut config = SweepConfig::default();
    config.hamiltonian.annealing_time = -1.0;
    assert!(matches!(
        run_sweep(&backend, &config).await,
        Err(SweepError::Config(_))
    ));
}

#[tokio::test]
async fn test_oversized_schedule_rejected_before_submission() {
    let backend = SimulatorBackend::new();
    let mut config = SweepConfig::default();
    config.schedule.points = 3;
    config.schedule.steps_per_point = usize::MAX / 2 + 1;
    config.calibration = CalibrationMode::None;
    assert!(matches!(config.validate(), Err(SweepError::Config(_))));
    assert!(matches!(
        run_sweep(&backend, &config).await,
        Err(SweepError::Config(_))
    ));

    config.schedule.steps_per_point = landau_sim::MAX_TOTAL_STEPS;
    assert!(matches!(
        run_sweep(&backend, &config).await,
        Err(SweepError::Config(_))
    ));
}

#[tokio::test]
async fn test_degenerate_start_is_arithmetic_error() {
    let backend = SimulatorBackend::new();
    let mut config = single_point(0.0);
    config.hamiltonian.gap = 0.0;
    assert!(matches!(
        run_sweep(&backend, &config).await,
        Err(SweepError::Simulation(_))
    ));
}
