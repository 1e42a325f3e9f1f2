//! The sweep loop.

use landau_hal::{Backend, ReadoutError};
use landau_ir::QubitId;
use landau_sim::SweepEvolution;
use tracing::{debug, info, instrument};

use crate::config::SweepConfig;
use crate::error::SweepResult;
use crate::readout::{CalibrationMode, ConfusionMatrix, qubit_probabilities};
use crate::report::{SweepPoint, SweepReport};

/// Run a sweep on `backend`.
pub async fn run_sweep(backend: &dyn Backend, config: &SweepConfig) -> SweepResult<SweepReport> {
    run_sweep_with(backend, config, |_| {}).await
}

/// Run a sweep, calling `on_point` after each grid point is measured.
///
/// Jobs run one at a time in grid order. Calibration data is read once,
/// before the first job. The first backend failure ends the sweep.
#[instrument(skip_all, fields(backend = backend.name(), points = config.schedule.points))]
pub async fn run_sweep_with(
    backend: &dyn Backend,
    config: &SweepConfig,
    mut on_point: impl FnMut(&SweepPoint) + Send,
) -> SweepResult<SweepReport> {
    config.validate()?;

    let model = config.model()?;
    let grid = config.time_grid()?;
    let evolution = SweepEvolution::new(model, grid)?;
    let target = config.register.target;
    let num_qubits = config.register.num_qubits;
    let shots = config.shots;
    let policy = config.wait_policy();

    let readout = match config.calibration {
        CalibrationMode::None => None,
        _ => Some(backend.properties().await?.readout_error(target)?),
    };
    let matrix = readout
        .map(ConfusionMatrix::from_readout)
        .transpose()?
        .unwrap_or_else(ConfusionMatrix::identity);
    if let Some(ReadoutError {
        prob_meas1_prep0,
        prob_meas0_prep1,
    }) = readout
    {
        info!(
            qubit = target,
            prob_meas1_prep0, prob_meas0_prep1, "using readout calibration"
        );
    }

    let mut points = Vec::with_capacity(grid.points);
    for index in 0..grid.points {
        let circuit = evolution.circuit(index, num_qubits, QubitId(target))?;
        debug!(
            index,
            gates = circuit.gate_count(),
            depth = circuit.depth(),
            "built circuit"
        );

        let job_id = backend.submit(&circuit, shots).await?;
        let result = backend.wait_with(&job_id, &policy).await?;

        let raw = qubit_probabilities(&result.counts, target, num_qubits, shots)?;
        let calibrated = config.calibration.correct(&matrix, raw)?;
        let ideal = evolution.ideal_probabilities(index)?;

        let point = SweepPoint {
            index,
            time: grid.point_time(index),
            steps: grid.steps_at(index),
            job_id: job_id.0,
            raw,
            calibrated,
            ideal,
            execution_time_ms: result.execution_time_ms,
        };
        info!(
            index,
            time = point.time,
            p1_raw = raw[1],
            p1_calibrated = calibrated[1],
            p1_ideal = ideal[1],
            "measured grid point"
        );
        on_point(&point);
        points.push(point);
    }

    Ok(SweepReport {
        backend: backend.name().to_string(),
        annealing_time: config.hamiltonian.annealing_time,
        gap: config.hamiltonian.gap,
        num_qubits,
        target,
        shots,
        calibration: config.calibration,
        readout,
        diabatic_probability: model.diabatic_transition_probability(),
        points,
    })
}
