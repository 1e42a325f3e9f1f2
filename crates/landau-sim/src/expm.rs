//! Matrix exponential by scaling and squaring with a degree-13 Padé
//! approximant (Higham 2005).
//!
//! The step operators of a sweep are 2x2, so the routine is written for
//! small dense matrices and makes no attempt at blocking.

use ndarray::{Array2, s};
use num_complex::Complex64;

use crate::error::{SimError, SimResult};

/// Largest 1-norm for which the unscaled Padé(13) approximant is accurate.
const THETA_13: f64 = 5.371_920_351_148_152;

/// Padé(13, 13) coefficients b_0 ..= b_13.
const PADE_13: [f64; 14] = [
    64_764_752_532_480_000.0,
    32_382_376_266_240_000.0,
    7_771_770_303_897_600.0,
    1_187_353_796_428_800.0,
    129_060_195_264_000.0,
    10_559_470_521_600.0,
    670_442_572_800.0,
    33_522_128_640.0,
    1_323_241_920.0,
    40_840_800.0,
    960_960.0,
    16_380.0,
    182.0,
    1.0,
];

#[inline]
fn re(x: f64) -> Complex64 {
    Complex64::new(x, 0.0)
}

/// Compute `exp(A)` for a square complex matrix.
pub fn expm(a: &Array2<Complex64>) -> SimResult<Array2<Complex64>> {
    let (rows, cols) = a.dim();
    if rows != cols {
        return Err(SimError::NotSquare { rows, cols });
    }
    if a.iter().any(|z| !z.re.is_finite() || !z.im.is_finite()) {
        return Err(SimError::InvalidParameter {
            name: "matrix",
            reason: "contains non-finite entries".into(),
        });
    }
    if rows == 0 {
        return Ok(Array2::zeros((0, 0)));
    }

    let norm = one_norm(a);
    let squarings = if norm > THETA_13 {
        (norm / THETA_13).log2().ceil() as i32
    } else {
        0
    };
    let scaled = a * re(2f64.powi(-squarings));

    let mut result = pade13(&scaled)?;
    for _ in 0..squarings {
        result = result.dot(&result);
    }
    Ok(result)
}

/// `r_13(A) = (V - U)^{-1} (V + U)` with U odd and V even in A.
fn pade13(a: &Array2<Complex64>) -> SimResult<Array2<Complex64>> {
    let b = PADE_13;
    let eye = Array2::<Complex64>::eye(a.nrows());
    let a2 = a.dot(a);
    let a4 = a2.dot(&a2);
    let a6 = a4.dot(&a2);

    let u_inner = a6.dot(&(&a6 * re(b[13]) + &a4 * re(b[11]) + &a2 * re(b[9])))
        + &a6 * re(b[7])
        + &a4 * re(b[5])
        + &a2 * re(b[3])
        + &eye * re(b[1]);
    let u = a.dot(&u_inner);

    let v = a6.dot(&(&a6 * re(b[12]) + &a4 * re(b[10]) + &a2 * re(b[8])))
        + &a6 * re(b[6])
        + &a4 * re(b[4])
        + &a2 * re(b[2])
        + &eye * re(b[0]);

    solve(&v - &u, &v + &u)
}

/// Solve `A X = B` by Gaussian elimination with partial pivoting.
fn solve(a: Array2<Complex64>, b: Array2<Complex64>) -> SimResult<Array2<Complex64>> {
    let n = a.nrows();
    let m = b.ncols();
    let mut aug = Array2::<Complex64>::zeros((n, n + m));
    aug.slice_mut(s![.., ..n]).assign(&a);
    aug.slice_mut(s![.., n..]).assign(&b);

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| aug[[i, col]].norm().total_cmp(&aug[[j, col]].norm()))
            .unwrap_or(col);
        if aug[[pivot_row, col]].norm() < f64::EPSILON {
            return Err(SimError::SingularMatrix);
        }
        if pivot_row != col {
            for j in 0..(n + m) {
                aug.swap([col, j], [pivot_row, j]);
            }
        }

        let pivot = aug[[col, col]];
        for row in (col + 1)..n {
            let factor = aug[[row, col]] / pivot;
            for j in col..(n + m) {
                let above = aug[[col, j]];
                aug[[row, j]] -= factor * above;
            }
        }
    }

    let mut x = Array2::<Complex64>::zeros((n, m));
    for row in (0..n).rev() {
        for j in 0..m {
            let mut acc = aug[[row, n + j]];
            for k in (row + 1)..n {
                acc -= aug[[row, k]] * x[[k, j]];
            }
            x[[row, j]] = acc / aug[[row, row]];
        }
    }
    Ok(x)
}

/// Maximum absolute column sum.
fn one_norm(a: &Array2<Complex64>) -> f64 {
    a.columns()
        .into_iter()
        .map(|col| col.iter().map(|z| z.norm()).sum::<f64>())
        .fold(0.0, f64::max)
}
