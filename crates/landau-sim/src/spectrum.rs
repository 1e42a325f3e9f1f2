//! Closed-form eigen-decomposition of 2x2 Hermitian matrices.
//!
//! For `H = [[a, b], [b*, d]]` the eigenvalues are `m ∓ r` with
//! `m = (a + d)/2` and `r = sqrt(((a - d)/2)² + |b|²)`.

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::hamiltonian::LandauZener;

/// Relative tolerance for the Hermiticity and degeneracy checks.
const TOLERANCE: f64 = 1e-12;

/// Eigenvalues and eigenvectors of a 2x2 Hermitian matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Eigensystem {
    /// Eigenvalues in ascending order.
    pub values: [f64; 2],
    /// Normalized eigenvectors, `vectors[i]` belonging to `values[i]`.
    ///
    /// Each vector's phase is fixed so its leading nonzero amplitude is real
    /// and positive.
    pub vectors: [[Complex64; 2]; 2],
}

impl Eigensystem {
    /// Lowest eigenvalue and its eigenvector.
    pub fn ground(&self) -> (f64, [Complex64; 2]) {
        (self.values[0], self.vectors[0])
    }
}

/// Eigen-decompose a 2x2 Hermitian matrix.
///
/// Fails when the matrix is not 2x2, not Hermitian, or has a repeated
/// eigenvalue (the eigenvectors are then not unique).
pub fn eigh(h: &Array2<Complex64>) -> SimResult<Eigensystem> {
    let (rows, cols) = h.dim();
    if rows != 2 || cols != 2 {
        return Err(SimError::NotSquare { rows, cols });
    }
    if h.iter().any(|z| !z.re.is_finite() || !z.im.is_finite()) {
        return Err(SimError::InvalidParameter {
            name: "hamiltonian",
            reason: "contains non-finite entries".into(),
        });
    }

    let scale = h.iter().map(|z| z.norm()).fold(1.0, f64::max);
    let (a, b, b_conj, d) = (h[[0, 0]], h[[0, 1]], h[[1, 0]], h[[1, 1]]);
    if a.im.abs() > TOLERANCE * scale
        || d.im.abs() > TOLERANCE * scale
        || (b - b_conj.conj()).norm() > TOLERANCE * scale
    {
        return Err(SimError::NotHermitian(format!(
            "[[{a}, {b}], [{b_conj}, {d}]]"
        )));
    }

    let (a, d) = (a.re, d.re);
    let mean = (a + d) / 2.0;
    let radius = ((a - d) / 2.0).hypot(b.norm());
    if radius <= TOLERANCE * scale {
        return Err(SimError::DegenerateSpectrum { value: mean });
    }

    let values = [mean - radius, mean + radius];
    let vectors = values.map(|lambda| eigenvector(a, b, d, lambda));
    Ok(Eigensystem { values, vectors })
}

/// Eigenvector of `[[a, b], [b*, d]]` for eigenvalue `lambda`.
fn eigenvector(a: f64, b: Complex64, d: f64, lambda: f64) -> [Complex64; 2] {
    // Both candidates solve (H - λ)v = 0; the longer one is better conditioned.
    let first = [b, Complex64::new(lambda - a, 0.0)];
    let second = [Complex64::new(lambda - d, 0.0), b.conj()];
    let norm = |v: &[Complex64; 2]| (v[0].norm_sqr() + v[1].norm_sqr()).sqrt();

    let v = if norm(&first) >= norm(&second) {
        first
    } else {
        second
    };
    let n = norm(&v);
    let lead = if v[0].norm() > TOLERANCE * n { v[0] } else { v[1] };
    let phase = lead.conj() / lead.norm();
    [v[0] * phase / n, v[1] * phase / n]
}

/// Ground state of the Landau-Zener Hamiltonian at time `t`.
pub fn ground_state(t: f64, annealing_time: f64, gap: f64) -> SimResult<[Complex64; 2]> {
    let model = LandauZener::new(annealing_time, gap)?;
    model.ground_state(t)
}

impl LandauZener {
    /// Full eigensystem of H(t).
    pub fn eigensystem(&self, t: f64) -> SimResult<Eigensystem> {
        eigh(&self.hamiltonian(t))
    }

    /// Eigenvector of the lowest eigenvalue of H(t).
    pub fn ground_state(&self, t: f64) -> SimResult<[Complex64; 2]> {
        let (energy, state) = self.eigensystem(t)?.ground();
        debug!(t, energy, "ground state");
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_diagonal_matrix() {
        let h = array![[c(2.0, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(-1.0, 0.0)]];
        let eig = eigh(&h).unwrap();
        assert_eq!(eig.values, [-1.0, 2.0]);
        assert!((eig.vectors[0][1] - c(1.0, 0.0)).norm() < 1e-15);
        assert!((eig.vectors[1][0] - c(1.0, 0.0)).norm() < 1e-15);
    }

    #[test]
    fn test_complex_off_diagonal() {
        let h = array![[c(0.0, 0.0), c(0.0, -1.0)], [c(0.0, 1.0), c(0.0, 0.0)]];
        let eig = eigh(&h).unwrap();
        assert!((eig.values[0] + 1.0).abs() < 1e-14);
        for (lambda, v) in eig.values.iter().zip(eig.vectors.iter()) {
            let hv0 = h[[0, 0]] * v[0] + h[[0, 1]] * v[1];
            let hv1 = h[[1, 0]] * v[0] + h[[1, 1]] * v[1];
            assert!((hv0 - v[0] * lambda).norm() < 1e-14);
            assert!((hv1 - v[1] * lambda).norm() < 1e-14);
        }
    }

    #[test]
    fn test_rejects_non_hermitian() {
        let h = array![[c(0.0, 0.0), c(1.0, 0.0)], [c(2.0, 0.0), c(0.0, 0.0)]];
        assert!(matches!(eigh(&h), Err(SimError::NotHermitian(_))));
        let h = array![[c(0.0, 1.0), c(0.0, 0.0)], [c(0.0, 0.0), c(0.0, 0.0)]];
        assert!(matches!(eigh(&h), Err(SimError::NotHermitian(_))));
    }

    #[test]
    fn test_degenerate_spectrum() {
        assert!(matches!(
            ground_state(0.0, 1.0, 0.0),
            Err(SimError::DegenerateSpectrum { .. })
        ));
        // Away from the crossing a zero gap is fine.
        let state = ground_state(-1.0, 1.0, 0.0).unwrap();
        assert!((state[0] - c(1.0, 0.0)).norm() < 1e-15);
    }
}
