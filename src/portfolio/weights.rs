//! # Weight Vector
//!
//! $$
//! w_i \ge 0,\qquad \sum_i w_i = 1
//! $$
//!
//! Long-only portfolio weights keyed by asset identifier.

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::error::InputError;
use crate::error::Result;

/// Tolerance on `sum(w) = 1`.
pub const WEIGHT_SUM_TOL: f64 = 1e-9;

/// Non-negative weights summing to one, iterated in identifier order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WeightVector {
  weights: BTreeMap<String, f64>,
}

impl WeightVector {
  /// Normalize raw non-negative scores into weights.
  ///
  /// Fails on a negative or non-finite score, a repeated asset, or a zero
  /// total.
  pub fn normalized<I, S>(raw: I) -> Result<Self>
  where
    I: IntoIterator<Item = (S, f64)>,
    S: Into<String>,
  {
    let mut weights = BTreeMap::new();
    for (asset, w) in raw {
      let asset = asset.into();
      if !(w.is_finite() && w >= 0.0) {
        return Err(InputError::InvalidWeight { asset, weight: w }.into());
      }
      if weights.contains_key(&asset) {
        return Err(InputError::DuplicateAsset(asset).into());
      }
      weights.insert(asset, w);
    }

    let total: f64 = weights.values().sum();
    if !(total.is_finite() && total > 0.0) {
      return Err(InputError::ZeroTotalWeight.into());
    }
    for w in weights.values_mut() {
      *w /= total;
    }

    Ok(Self { weights })
  }

  /// Pair already-sorted assets with their raw weights and normalize.
  pub(crate) fn from_parts(assets: &[String], raw: &[f64]) -> Result<Self> {
    Self::normalized(assets.iter().cloned().zip(raw.iter().copied()))
  }

  pub fn get(&self, asset: &str) -> Option<f64> {
    self.weights.get(asset).copied()
  }

  pub fn len(&self) -> usize {
    self.weights.len()
  }

  pub fn is_empty(&self) -> bool {
    self.weights.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
    self.weights.iter().map(|(a, w)| (a.as_str(), *w))
  }

  pub fn assets(&self) -> impl Iterator<Item = &str> + '_ {
    self.weights.keys().map(String::as_str)
  }

  /// Weights in identifier order, aligned with [`ReturnMatrix`](super::ReturnMatrix) columns.
  pub fn to_vec(&self) -> Vec<f64> {
    self.weights.values().copied().collect()
  }

  pub fn total(&self) -> f64 {
    self.weights.values().sum()
  }

  pub fn into_inner(self) -> BTreeMap<String, f64> {
    self.weights
  }
}

impl Display for WeightVector {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for (asset, w) in self.iter() {
      writeln!(f, "{asset:<12} {:>8.4}%", w * 100.0)?;
    }
    Ok(())
  }
}
