//! Multivariate normal prior evaluated in whitened coordinates.
//!
//! The covariance is given by a lower triangular factor `L` with
//! `cov = L * L^T`. With `LI = L^-1` the residual `LI * (x - mean)` is
//! standard normal, so the log density reduces to a sum of squares.

use faer::Mat;

use crate::error::{check_dim, MvnError, Result};
use crate::math::{axpy_column_tail, lower_matvec, lower_triangular_inverse, whitened_logp};

#[derive(Debug, Clone)]
pub struct WhitenedGaussianPrior {
    mean: Vec<f64>,
    factor: Mat<f64>,
    inverse: Option<Mat<f64>>,
}

impl WhitenedGaussianPrior {
    /// Create a prior from its mean and lower triangular covariance factor.
    ///
    /// Only the shapes are checked here. Whether the factor is actually
    /// invertible and triangular is checked when the inverse is first needed.
    pub fn new(mean: Vec<f64>, factor: Mat<f64>) -> Result<Self> {
        check_dim("factor rows", mean.len(), factor.nrows())?;
        check_dim("factor columns", mean.len(), factor.ncols())?;
        Ok(Self {
            mean,
            factor,
            inverse: None,
        })
    }

    /// Prior with the given mean and an identity factor.
    pub fn standard(mean: Vec<f64>) -> Self {
        let n = mean.len();
        let factor = Mat::from_fn(n, n, |row, col| if row == col { 1. } else { 0. });
        Self {
            mean,
            factor,
            inverse: None,
        }
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn factor(&self) -> &Mat<f64> {
        &self.factor
    }

    pub fn set_mean(&mut self, mean: Vec<f64>) -> Result<()> {
        check_dim("mean", self.dim(), mean.len())?;
        self.mean = mean;
        Ok(())
    }

    /// Replace the covariance factor. The cached inverse is dropped and
    /// recomputed on the next request.
    pub fn set_factor(&mut self, factor: Mat<f64>) -> Result<()> {
        check_dim("factor rows", self.dim(), factor.nrows())?;
        check_dim("factor columns", self.dim(), factor.ncols())?;
        self.factor = factor;
        self.inverse = None;
        Ok(())
    }

    pub fn has_cached_inverse(&self) -> bool {
        self.inverse.is_some()
    }

    /// The inverse of the covariance factor, computed on first use.
    pub fn inverse_factor(&mut self) -> Result<&Mat<f64>> {
        let inverse = match self.inverse.take() {
            Some(inverse) => inverse,
            None => lower_triangular_inverse(&self.factor)?,
        };
        Ok(self.inverse.insert(inverse))
    }

    /// `LI * values`
    pub fn whiten(&mut self, values: &[f64]) -> Result<Vec<f64>> {
        check_dim("vector", self.dim(), values.len())?;
        let inverse = self.inverse_factor()?;
        let mut out = vec![0f64; values.len()];
        lower_matvec(inverse, values, &mut out);
        Ok(out)
    }

    /// `LI * (vector - mean)`
    pub fn whitened_residual(&mut self, vector: &[f64]) -> Result<Vec<f64>> {
        check_dim("vector", self.dim(), vector.len())?;
        let centered: Vec<f64> = vector
            .iter()
            .zip(self.mean.iter())
            .map(|(x, m)| x - m)
            .collect();
        self.whiten(&centered)
    }

    /// Log density of `vector` up to the normalizing constant.
    pub fn whitened_log_density(&mut self, vector: &[f64]) -> Result<f64> {
        let residual = self.whitened_residual(vector)?;
        let zeros = vec![0f64; residual.len()];
        Ok(whitened_logp(&residual, &zeros))
    }

    /// Change of the whitened residual when `vector[index]` moves by `delta`.
    ///
    /// This is `delta` times column `index` of the inverse factor.
    pub fn incremental_whitened_delta(&mut self, index: usize, delta: f64) -> Result<Vec<f64>> {
        let mut out = vec![0f64; self.dim()];
        self.add_incremental_whitened_delta(index, delta, &mut out)?;
        Ok(out)
    }

    /// In-place form of [`Self::incremental_whitened_delta`]: adds the change
    /// to `whitened`.
    pub fn add_incremental_whitened_delta(
        &mut self,
        index: usize,
        delta: f64,
        whitened: &mut [f64],
    ) -> Result<()> {
        check_dim("whitened vector", self.dim(), whitened.len())?;
        if index >= self.dim() {
            return Err(MvnError::IndexOutOfBounds {
                index,
                len: self.dim(),
            });
        }
        let inverse = self.inverse_factor()?;
        axpy_column_tail(inverse, index, delta, whitened);
        Ok(())
    }
}
