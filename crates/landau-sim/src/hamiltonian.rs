//! The Landau-Zener two-level Hamiltonian.
//!
//! ```text
//! H(t) = 1/2 · [[ t/τ,   Δ  ],
//!               [  Δ,  -t/τ ]]
//! ```
//!
//! The diabatic levels ±t/(2τ) cross at t = 0 and are coupled by Δ/2, which
//! opens an avoided crossing of width Δ. τ is the annealing time: the
//! diabatic energies sweep at rate 1/τ.
//!
//! # Example
//!
//! ```rust
//! use landau_sim::hamiltonian::LandauZener;
//!
//! let lz = LandauZener::new(1.0, 1.0).unwrap();
//! let h = lz.hamiltonian(0.0);
//! assert_eq!(h[[0, 1]].re, 0.5);
//! assert_eq!(lz.energies(0.0), [-0.5, 0.5]);
//! ```

use std::f64::consts::PI;

use ndarray::{Array2, array};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Evaluate H(t) for annealing time τ and gap Δ.
///
/// Pure arithmetic: the result is Hermitian with zero trace for any finite
/// input, and no parameters are checked.
pub fn lz_hamiltonian(t: f64, annealing_time: f64, gap: f64) -> Array2<Complex64> {
    let z = t / annealing_time / 2.0;
    let x = gap / 2.0;
    array![
        [Complex64::new(z, 0.0), Complex64::new(x, 0.0)],
        [Complex64::new(x, 0.0), Complex64::new(-z, 0.0)],
    ]
}

/// Asymptotic probability of a diabatic transition across the whole sweep,
/// `exp(-π Δ² τ / 2)`.
pub fn diabatic_transition_probability(annealing_time: f64, gap: f64) -> f64 {
    (-PI * gap * gap * annealing_time / 2.0).exp()
}

/// A validated Landau-Zener model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandauZener {
    annealing_time: f64,
    gap: f64,
}

impl LandauZener {
    /// Create a model; τ must be positive and both parameters finite.
    pub fn new(annealing_time: f64, gap: f64) -> SimResult<Self> {
        if !annealing_time.is_finite() || annealing_time <= 0.0 {
            return Err(SimError::InvalidParameter {
                name: "annealing_time",
                reason: format!("must be positive and finite, got {annealing_time}"),
            });
        }
        if !gap.is_finite() {
            return Err(SimError::InvalidParameter {
                name: "gap",
                reason: format!("must be finite, got {gap}"),
            });
        }
        Ok(Self {
            annealing_time,
            gap,
        })
    }

    /// Annealing time τ.
    pub fn annealing_time(&self) -> f64 {
        self.annealing_time
    }

    /// Gap Δ.
    pub fn gap(&self) -> f64 {
        self.gap
    }

    /// H(t).
    pub fn hamiltonian(&self, t: f64) -> Array2<Complex64> {
        lz_hamiltonian(t, self.annealing_time, self.gap)
    }

    /// Adiabatic energies at `t`, ascending: `∓sqrt((t/τ)² + Δ²)/2`.
    pub fn energies(&self, t: f64) -> [f64; 2] {
        let half = (t / self.annealing_time).hypot(self.gap) / 2.0;
        [-half, half]
    }

    /// Asymptotic diabatic transition probability of this model.
    pub fn diabatic_transition_probability(&self) -> f64 {
        diabatic_transition_probability(self.annealing_time, self.gap)
    }
}
