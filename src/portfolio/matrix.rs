//! # Dependence Matrices
//!
//! $$
//! \rho_{ij} = \frac{\Sigma_{ij}}{\sigma_i \sigma_j},\qquad
//! d_{ij} = \sqrt{\tfrac12 (1 - \rho_{ij})}
//! $$
//!
//! Sample covariance, Pearson correlation and correlation distance.

use ndarray::Array2;
use ndarray_stats::CorrelationExt;

use super::returns::ReturnMatrix;
use crate::error::InputError;
use crate::error::Result;

/// Variances at or below this are treated as a constant series.
pub const ZERO_VARIANCE_TOL: f64 = 1e-20;

/// Unbiased (`ddof = 1`) sample covariance of the return columns.
pub fn covariance_matrix(returns: &ReturnMatrix) -> Result<Array2<f64>> {
  let mut cov = returns.values().t().cov(1.0).map_err(|_| InputError::TooFewObservations {
    observations: returns.n_observations(),
    required: super::returns::MIN_OBSERVATIONS,
  })?;

  let n = cov.nrows();
  for i in 0..n {
    for j in (i + 1)..n {
      cov[[j, i]] = cov[[i, j]];
    }
  }

  Ok(cov)
}

/// Pearson correlation derived from a covariance matrix.
///
/// Pairs involving a zero-variance asset get correlation 0 rather than 0/0,
/// except two constant assets with bitwise identical series, which get 1.
/// Fails if any variance or correlation entry is not finite.
pub fn correlation_matrix(returns: &ReturnMatrix, cov: &Array2<f64>) -> Result<Array2<f64>> {
  let n = cov.nrows();
  if cov.ncols() != n {
    return Err(
      InputError::NotSquare {
        rows: n,
        cols: cov.ncols(),
      }
      .into(),
    );
  }

  let assets = returns.assets();
  let non_finite = |i: usize, j: usize| InputError::NonFiniteCorrelation {
    first: assets[i].clone(),
    second: assets[j].clone(),
  };

  let mut sigmas = Vec::with_capacity(n);
  for i in 0..n {
    let var = cov[[i, i]];
    if !var.is_finite() {
      return Err(non_finite(i, i).into());
    }
    sigmas.push(if var > ZERO_VARIANCE_TOL { var.sqrt() } else { 0.0 });
  }

  let mut corr = Array2::eye(n);
  for i in 0..n {
    for j in (i + 1)..n {
      let r = if sigmas[i] > 0.0 && sigmas[j] > 0.0 {
        cov[[i, j]] / (sigmas[i] * sigmas[j])
      } else if sigmas[i] == 0.0 && sigmas[j] == 0.0 && same_series(returns, i, j) {
        1.0
      } else {
        0.0
      };
      if !r.is_finite() {
        return Err(non_finite(i, j).into());
      }
      let r = r.clamp(-1.0, 1.0);
      corr[[i, j]] = r;
      corr[[j, i]] = r;
    }
  }

  Ok(corr)
}

fn same_series(returns: &ReturnMatrix, i: usize, j: usize) -> bool {
  let values = returns.values();
  values
    .column(i)
    .iter()
    .zip(values.column(j))
    .all(|(a, b)| a.to_bits() == b.to_bits())
}

/// Correlation distance, a proper metric in `[0, 1]`.
pub fn distance_matrix(corr: &Array2<f64>) -> Array2<f64> {
  let mut dist = corr.mapv(|c| (0.5 * (1.0 - c)).max(0.0).sqrt());
  dist.diag_mut().fill(0.0);
  dist
}
