//! # Baseline Allocators
//!
//! $$
//! w_i^{\text{EW}} = \frac1N,\qquad
//! w_i^{\text{IV}} = \frac{1/\sigma_i}{\sum_j 1/\sigma_j}
//! $$
//!
//! Naive allocations HRP is usually benchmarked against.

use tracing::debug;

use super::hrp::DEFAULT_VARIANCE_FLOOR;
use super::matrix::covariance_matrix;
use super::returns::ReturnMatrix;
use super::weights::WeightVector;
use crate::error::Result;

/// `1/N` across every asset.
#[derive(Clone, Copy, Debug, Default)]
pub struct EqualWeightAllocator;

impl EqualWeightAllocator {
  pub fn allocate(&self, returns: &ReturnMatrix) -> Result<WeightVector> {
    WeightVector::normalized(returns.assets().iter().map(|a| (a.clone(), 1.0)))
  }
}

/// Weights proportional to inverse volatility.
///
/// Volatility is floored at `sqrt(variance_floor)`, so a constant series gets
/// a large but finite weight.
#[derive(Clone, Copy, Debug)]
pub struct InverseVolAllocator {
  pub variance_floor: f64,
}

impl Default for InverseVolAllocator {
  fn default() -> Self {
    Self {
      variance_floor: DEFAULT_VARIANCE_FLOOR,
    }
  }
}

impl InverseVolAllocator {
  pub fn allocate(&self, returns: &ReturnMatrix) -> Result<WeightVector> {
    let cov = covariance_matrix(returns)?;
    let floor = if self.variance_floor.is_finite() && self.variance_floor > 0.0 {
      self.variance_floor
    } else {
      DEFAULT_VARIANCE_FLOOR
    };
    debug!(assets = returns.n_assets(), "inverse-vol allocation");

    let inv_vols = returns
      .assets()
      .iter()
      .enumerate()
      .map(|(i, a)| (a.clone(), 1.0 / cov[[i, i]].max(floor).sqrt()));
    WeightVector::normalized(inv_vols)
  }
}
