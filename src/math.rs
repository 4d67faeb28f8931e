use faer::linalg::triangular_solve::solve_lower_triangular_in_place;
use faer::{Mat, Par};
use itertools::izip;

use crate::error::{MvnError, Result};

/// `-0.5 * |scaled - scaled_mean|^2`, the standard normal log density of a
/// whitened residual up to its normalizing constant.
#[inline]
pub(crate) fn whitened_logp(scaled: &[f64], scaled_mean: &[f64]) -> f64 {
    assert!(scaled.len() == scaled_mean.len());
    let sum_sq: f64 = izip!(scaled, scaled_mean)
        .map(|(x, m)| {
            let diff = x - m;
            diff * diff
        })
        .sum();
    -0.5 * sum_sq
}

/// `out <- lower * x`, touching only the lower triangle of `lower`.
pub(crate) fn lower_matvec(lower: &Mat<f64>, x: &[f64], out: &mut [f64]) {
    let n = x.len();
    assert!(lower.nrows() == n);
    assert!(lower.ncols() == n);
    assert!(out.len() == n);

    for (row, out) in out.iter_mut().enumerate() {
        *out = x[..=row]
            .iter()
            .enumerate()
            .map(|(col, val)| lower[(row, col)] * val)
            .sum();
    }
}

/// `y[k] += a * lower[(k, col)]` for `k >= col`.
///
/// The entries above the diagonal of a lower triangular matrix are zero, so
/// the rows before `col` are skipped.
#[inline]
pub(crate) fn axpy_column_tail(lower: &Mat<f64>, col: usize, a: f64, y: &mut [f64]) {
    assert!(lower.nrows() == y.len());
    y.iter_mut()
        .enumerate()
        .skip(col)
        .for_each(|(row, y)| *y += a * lower[(row, col)]);
}

pub(crate) fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|val| val.is_finite())
}

fn mat_all_finite(mat: &Mat<f64>) -> bool {
    let mut ok = true;
    faer::zip!(mat).for_each(|faer::unzip!(val)| ok &= val.is_finite());
    ok
}

/// Check that `factor` is square, lower triangular, finite and has no zero
/// on its diagonal.
///
/// The sign of the diagonal is irrelevant: flipping the sign of a column of
/// `L` leaves `L * L^T` unchanged.
pub(crate) fn check_lower_triangular(factor: &Mat<f64>) -> Result<()> {
    let n = factor.nrows();
    if factor.ncols() != n {
        return Err(MvnError::Factorization(format!(
            "factor must be square, got {}x{}",
            n,
            factor.ncols()
        )));
    }
    for col in 0..n {
        let diag = factor[(col, col)];
        if !diag.is_finite() || diag == 0. {
            return Err(MvnError::Factorization(format!(
                "diagonal entry {col} is {diag}, factor is singular"
            )));
        }
        for row in 0..n {
            let val = factor[(row, col)];
            if row < col && val != 0. {
                return Err(MvnError::Factorization(format!(
                    "entry ({row}, {col}) above the diagonal is {val}, factor is not lower triangular"
                )));
            }
            if !val.is_finite() {
                return Err(MvnError::Factorization(format!(
                    "entry ({row}, {col}) is not finite"
                )));
            }
        }
    }
    Ok(())
}

/// Solve `factor * X = I` in place, starting from the identity.
pub(crate) fn lower_triangular_inverse(factor: &Mat<f64>) -> Result<Mat<f64>> {
    check_lower_triangular(factor)?;
    let n = factor.nrows();
    let mut inv = Mat::<f64>::identity(n, n);
    solve_lower_triangular_in_place(factor.as_ref(), inv.as_mut(), Par::Seq);

    if !mat_all_finite(&inv) {
        return Err(MvnError::Factorization(
            "inverse of the factor is not finite, factor is numerically singular".into(),
        ));
    }
    Ok(inv)
}
