//! Discretized time evolution and sweep circuit construction.
//!
//! The evolution is approximated by a product of step operators
//! `U_k = exp(-i H(t_k) dt)` sampled at the left edge of each step,
//! `t_k = t_start + k·dt`. Grid point `j` of a sweep applies the first
//! `j · steps_per_point` of them to the ground state of `H(t_start)`.

use landau_ir::{Circuit, QubitId, Unitary2x2};
use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{SimError, SimResult};
use crate::expm::expm;
use crate::hamiltonian::LandauZener;

/// Tolerance for accepting a computed step operator as unitary.
const UNITARY_TOLERANCE: f64 = 1e-9;

/// Upper bound on the step operators one sweep may compute.
pub const MAX_TOTAL_STEPS: usize = 1_000_000;

/// Time discretization of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeGrid {
    /// Time of the initial state.
    pub t_start: f64,
    /// Width of one step.
    pub dt: f64,
    /// Step operators added between consecutive grid points.
    pub steps_per_point: usize,
    /// Number of grid points.
    pub points: usize,
}

impl TimeGrid {
    /// Create a grid; `t_start` and `dt` must be finite and the last point
    /// may need at most [`MAX_TOTAL_STEPS`] step operators.
    pub fn new(t_start: f64, dt: f64, steps_per_point: usize, points: usize) -> SimResult<Self> {
        if !t_start.is_finite() {
            return Err(SimError::InvalidParameter {
                name: "t_start",
                reason: format!("must be finite, got {t_start}"),
            });
        }
        if !dt.is_finite() {
            return Err(SimError::InvalidParameter {
                name: "dt",
                reason: format!("must be finite, got {dt}"),
            });
        }
        let grid = Self {
            t_start,
            dt,
            steps_per_point,
            points,
        };
        grid.checked_total_steps()?;
        Ok(grid)
    }

    /// Number of step operators grid point `point` applies.
    ///
    /// Saturates instead of overflowing; points inside a grid accepted by
    /// [`TimeGrid::new`] never saturate.
    pub fn steps_at(&self, point: usize) -> usize {
        point.saturating_mul(self.steps_per_point)
    }

    /// Step operators needed for the last grid point.
    pub fn total_steps(&self) -> usize {
        self.points.checked_sub(1).map_or(0, |last| self.steps_at(last))
    }

    /// [`TimeGrid::total_steps`], failing when it overflows or exceeds
    /// [`MAX_TOTAL_STEPS`].
    pub fn checked_total_steps(&self) -> SimResult<usize> {
        let last = self.points.saturating_sub(1);
        last.checked_mul(self.steps_per_point)
            .filter(|&total| total <= MAX_TOTAL_STEPS)
            .ok_or_else(|| SimError::InvalidParameter {
                name: "steps_per_point",
                reason: format!(
                    "{} points of {} steps exceed the limit of {MAX_TOTAL_STEPS} step operators",
                    self.points, self.steps_per_point
                ),
            })
    }

    /// Sample time of step `k`.
    pub fn step_time(&self, k: usize) -> f64 {
        self.t_start + k as f64 * self.dt
    }

    /// Physical time reached at grid point `point`.
    pub fn point_time(&self, point: usize) -> f64 {
        self.step_time(self.steps_at(point))
    }
}

/// The step operator `exp(-i H(t) dt)`.
pub fn step_unitary(model: &LandauZener, t: f64, dt: f64) -> SimResult<Unitary2x2> {
    let generator: Array2<Complex64> = model.hamiltonian(t) * Complex64::new(0.0, -dt);
    let u = expm(&generator)?;
    Ok(Unitary2x2::new(u[[0, 0]], u[[0, 1]], u[[1, 0]], u[[1, 1]]))
}

/// All operators and states of one sweep, computed up front.
#[derive(Debug, Clone)]
pub struct SweepEvolution {
    model: LandauZener,
    grid: TimeGrid,
    initial_state: [Complex64; 2],
    steps: Vec<Unitary2x2>,
}

impl SweepEvolution {
    /// Compute the initial ground state and every step operator.
    #[instrument(skip_all, fields(points = grid.points, total_steps = grid.total_steps()))]
    pub fn new(model: LandauZener, grid: TimeGrid) -> SimResult<Self> {
        let total_steps = grid.checked_total_steps()?;
        let initial_state = model.ground_state(grid.t_start)?;

        let steps = (0..total_steps)
            .map(|k| {
                let t = grid.step_time(k);
                let u = step_unitary(&model, t, grid.dt)?;
                if !u.is_unitary(UNITARY_TOLERANCE) {
                    return Err(SimError::NonUnitary { step: k, time: t });
                }
                Ok(u)
            })
            .collect::<SimResult<Vec<_>>>()?;

        debug!(steps = steps.len(), "computed step operators");
        Ok(Self {
            model,
            grid,
            initial_state,
            steps,
        })
    }

    /// The model being evolved.
    pub fn model(&self) -> &LandauZener {
        &self.model
    }

    /// The time grid.
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// Ground state of `H(t_start)`.
    pub fn initial_state(&self) -> [Complex64; 2] {
        self.initial_state
    }

    /// Step operators in application order.
    pub fn steps(&self) -> &[Unitary2x2] {
        &self.steps
    }

    fn check_point(&self, point: usize) -> SimResult<()> {
        if point < self.grid.points {
            Ok(())
        } else {
            Err(SimError::PointOutOfRange {
                point,
                points: self.grid.points,
            })
        }
    }

    /// Circuit for grid point `point` on a register of `num_qubits`.
    ///
    /// `target` is prepared in the initial ground state and evolved; the
    /// other qubits stay in |0⟩. Every qubit is measured into the classical
    /// bit of the same index.
    pub fn circuit(&self, point: usize, num_qubits: u32, target: QubitId) -> SimResult<Circuit> {
        self.check_point(point)?;

        let mut circuit = Circuit::with_size(format!("lz_point_{point}"), num_qubits, num_qubits);
        circuit.initialize(self.initial_state, target)?;
        for (k, u) in self.steps[..self.grid.steps_at(point)].iter().enumerate() {
            circuit.unitary(*u, format!("U_{k}"), target)?;
        }
        circuit.measure_all()?;
        Ok(circuit)
    }

    /// Noiseless state of the target qubit at grid point `point`.
    pub fn ideal_state(&self, point: usize) -> SimResult<[Complex64; 2]> {
        self.check_point(point)?;
        Ok(self.steps[..self.grid.steps_at(point)]
            .iter()
            .fold(self.initial_state, |state, u| u.apply(state)))
    }

    /// Noiseless `[P(0), P(1)]` of the target qubit at grid point `point`.
    pub fn ideal_probabilities(&self, point: usize) -> SimResult<[f64; 2]> {
        let [a, b] = self.ideal_state(point)?;
        Ok([a.norm_sqr(), b.norm_sqr()])
    }
}
