//! 2x2 unitary matrices.
//!
//! Every gate in a Landau-Zener sweep acts on a single qubit, so the IR
//! carries its operators as dense 2x2 complex matrices. This module provides
//! the matrix algebra the rest of the workspace needs: products, adjoints,
//! unitarity checks, comparison up to global phase, and the decomposition
//! into OpenQASM `U(θ, φ, λ)` Euler angles.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Tolerance for floating point comparisons.
pub const EPSILON: f64 = 1e-10;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// A 2x2 matrix in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Unitary2x2 {
    /// The matrix elements in row-major order: [[a, b], [c, d]].
    pub data: [Complex64; 4],
}

/// Euler angles of `U(θ, φ, λ)` plus the global phase γ, such that
/// `matrix = e^{iγ} · U(θ, φ, λ)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UAngles {
    /// Polar angle θ.
    pub theta: f64,
    /// Phase φ applied after the rotation.
    pub phi: f64,
    /// Phase λ applied before the rotation.
    pub lambda: f64,
    /// Global phase γ.
    pub phase: f64,
}

impl Unitary2x2 {
    /// Create a new 2x2 matrix from its entries.
    pub fn new(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> Self {
        Self { data: [a, b, c, d] }
    }

    /// Create the identity matrix.
    pub fn identity() -> Self {
        Self::new(ONE, ZERO, ZERO, ONE)
    }

    /// Pauli-X.
    pub fn x() -> Self {
        Self::new(ZERO, ONE, ONE, ZERO)
    }

    /// Hadamard.
    pub fn h() -> Self {
        let s = Complex64::new(1.0 / 2.0_f64.sqrt(), 0.0);
        Self::new(s, s, s, -s)
    }

    /// sqrt(X).
    pub fn sx() -> Self {
        let p = Complex64::new(0.5, 0.5);
        let m = Complex64::new(0.5, -0.5);
        Self::new(p, m, m, p)
    }

    /// Rotation around Z: `diag(e^{-iθ/2}, e^{iθ/2})`.
    pub fn rz(theta: f64) -> Self {
        Self::new(
            Complex64::from_polar(1.0, -theta / 2.0),
            ZERO,
            ZERO,
            Complex64::from_polar(1.0, theta / 2.0),
        )
    }

    /// Rotation around Y.
    pub fn ry(theta: f64) -> Self {
        let c = Complex64::new((theta / 2.0).cos(), 0.0);
        let s = Complex64::new((theta / 2.0).sin(), 0.0);
        Self::new(c, -s, s, c)
    }

    /// The OpenQASM universal single-qubit gate U(θ, φ, λ).
    pub fn u(theta: f64, phi: f64, lambda: f64) -> Self {
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        Self::new(
            Complex64::new(c, 0.0),
            -Complex64::from_polar(s, lambda),
            Complex64::from_polar(s, phi),
            Complex64::from_polar(c, phi + lambda),
        )
    }

    /// The `U(θ, φ, 0)` gate that maps |0⟩ onto `state` up to global phase.
    ///
    /// `state` need not be normalized; only the amplitude ratio matters.
    pub fn preparing(state: [Complex64; 2]) -> Self {
        let [a, b] = state;
        let theta = 2.0 * b.norm().atan2(a.norm());
        let phi = b.arg() - a.arg();
        Self::u(theta, phi, 0.0)
    }

    /// Multiply this matrix by another: `self * other`.
    #[allow(clippy::many_single_char_names)]
    pub fn mul(&self, other: &Self) -> Self {
        let [a, b, c, d] = self.data;
        let [e, f, g, h] = other.data;
        Self::new(a * e + b * g, a * f + b * h, c * e + d * g, c * f + d * h)
    }

    /// Conjugate transpose.
    pub fn dagger(&self) -> Self {
        Self::new(
            self.data[0].conj(),
            self.data[2].conj(),
            self.data[1].conj(),
            self.data[3].conj(),
        )
    }

    /// Apply the matrix to a single-qubit amplitude pair.
    pub fn apply(&self, state: [Complex64; 2]) -> [Complex64; 2] {
        let [a, b, c, d] = self.data;
        [a * state[0] + b * state[1], c * state[0] + d * state[1]]
    }

    /// Whether every entry is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|z| z.re.is_finite() && z.im.is_finite())
    }

    /// Whether `U†U = I` within `tol` in every entry.
    pub fn is_unitary(&self, tol: f64) -> bool {
        if !self.is_finite() {
            return false;
        }
        let product = self.dagger().mul(self);
        product
            .data
            .iter()
            .zip(Self::identity().data.iter())
            .all(|(got, want)| (got - want).norm() < tol)
    }

    /// Compare two matrices, ignoring a global phase.
    pub fn approx_eq_up_to_phase(&self, other: &Self, tol: f64) -> bool {
        // Anchor the phase on the largest entry to stay well-conditioned.
        let (k, anchor) = self
            .data
            .iter()
            .enumerate()
            .max_by(|(_, x), (_, y)| x.norm().total_cmp(&y.norm()))
            .map_or((0, ZERO), |(k, z)| (k, *z));
        if anchor.norm() < EPSILON {
            return other.data.iter().all(|z| z.norm() < tol);
        }
        let ratio = other.data[k] / anchor;
        if (ratio.norm() - 1.0).abs() > tol {
            return false;
        }
        self.data
            .iter()
            .zip(other.data.iter())
            .all(|(mine, theirs)| (mine * ratio - theirs).norm() < tol)
    }

    /// Decompose into `e^{iγ} · U(θ, φ, λ)`.
    ///
    /// Assumes the matrix is unitary.
    pub fn u_angles(&self) -> UAngles {
        let [a, b, c, d] = self.data;
        let theta = 2.0 * c.norm().atan2(a.norm());

        if a.norm() < EPSILON {
            // θ = π: only the off-diagonal carries phase information.
            let phase = c.arg();
            let lambda = (-b).arg() - phase;
            return UAngles {
                theta,
                phi: 0.0,
                lambda: normalize_angle(lambda),
                phase,
            };
        }

        let phase = a.arg();
        let phi = if c.norm() < EPSILON {
            0.0
        } else {
            c.arg() - phase
        };
        let lambda = d.arg() - phase - phi;

        UAngles {
            theta,
            phi: normalize_angle(phi),
            lambda: normalize_angle(lambda),
            phase,
        }
    }
}

impl Default for Unitary2x2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Unitary2x2 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Unitary2x2::mul(&self, &rhs)
    }
}

/// Normalize an angle to (-π, π].
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let mut a = angle.rem_euclid(2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    }
    a
}
