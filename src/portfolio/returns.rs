//! # Return Matrix
//!
//! $$
//! R \in \mathbb R^{T \times N},\qquad r_{t,i} = \frac{P_{t,i}}{P_{t-1,i}} - 1
//! $$
//!
//! Validated panel of per-asset returns. Columns are kept sorted by asset
//! identifier so every derived quantity is independent of the order in which
//! the caller supplied the assets.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use ndarray::Array2;
use ndarray::ArrayView1;
use ndarray::ArrayView2;
use ndarray::Axis;

use crate::error::InputError;
use crate::error::Result;

/// Minimum number of observations needed for a sample covariance.
pub const MIN_OBSERVATIONS: usize = 2;

/// `T x N` matrix of returns, one column per asset.
#[derive(Clone, Debug, PartialEq)]
pub struct ReturnMatrix {
  assets: Vec<String>,
  values: Array2<f64>,
}

impl ReturnMatrix {
  /// Build from one return series per asset.
  pub fn from_columns<I, S>(series: I) -> Result<Self>
  where
    I: IntoIterator<Item = (S, Vec<f64>)>,
    S: Into<String>,
  {
    let mut columns = BTreeMap::new();
    for (asset, values) in series {
      let asset = asset.into();
      if columns.contains_key(&asset) {
        return Err(InputError::DuplicateAsset(asset).into());
      }
      columns.insert(asset, values);
    }
    Self::from_sorted_columns(columns)
  }

  /// Build from time-ordered observations, each mapping asset to return.
  ///
  /// The first row fixes the asset set; every later row must carry exactly
  /// the same identifiers.
  pub fn from_rows<I, R, S>(rows: I) -> Result<Self>
  where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = (S, f64)>,
    S: Into<String>,
  {
    let mut columns: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut expected: Option<BTreeSet<String>> = None;

    for (row_idx, row) in rows.into_iter().enumerate() {
      let mut observation = BTreeMap::new();
      for (asset, value) in row {
        let asset = asset.into();
        if observation.insert(asset.clone(), value).is_some() {
          return Err(InputError::DuplicateAsset(asset).into());
        }
      }

      let keys: BTreeSet<String> = observation.keys().cloned().collect();
      match &expected {
        None => expected = Some(keys),
        Some(first) if *first != keys => {
          return Err(
            InputError::InconsistentAssets {
              row: row_idx,
              missing: first.difference(&keys).cloned().collect(),
              unexpected: keys.difference(first).cloned().collect(),
            }
            .into(),
          );
        }
        Some(_) => {}
      }

      for (asset, value) in observation {
        columns.entry(asset).or_default().push(value);
      }
    }

    Self::from_sorted_columns(columns)
  }

  /// Build from aligned price columns, converting each to simple returns.
  pub fn from_prices<I, S>(prices: I) -> Result<Self>
  where
    I: IntoIterator<Item = (S, Vec<f64>)>,
    S: Into<String>,
  {
    let mut series = Vec::new();
    for (asset, closes) in prices {
      let asset = asset.into();
      let returns = simple_returns(&asset, &closes)?;
      series.push((asset, returns));
    }
    Self::from_columns(series)
  }

  fn from_sorted_columns(columns: BTreeMap<String, Vec<f64>>) -> Result<Self> {
    let n_assets = columns.len();
    let Some(n_obs) = columns.values().next().map(Vec::len) else {
      return Err(InputError::NoAssets.into());
    };

    for (asset, column) in &columns {
      if column.len() != n_obs {
        return Err(
          InputError::LengthMismatch {
            asset: asset.clone(),
            expected: n_obs,
            found: column.len(),
          }
          .into(),
        );
      }
    }

    if n_obs < MIN_OBSERVATIONS {
      return Err(
        InputError::TooFewObservations {
          observations: n_obs,
          required: MIN_OBSERVATIONS,
        }
        .into(),
      );
    }

    let mut values = Array2::zeros((n_obs, n_assets));
    for (j, (asset, column)) in columns.iter().enumerate() {
      for (t, &r) in column.iter().enumerate() {
        if !r.is_finite() {
          return Err(
            InputError::NonFiniteReturn {
              asset: asset.clone(),
              row: t,
            }
            .into(),
          );
        }
        values[[t, j]] = r;
      }
    }

    Ok(Self {
      assets: columns.into_keys().collect(),
      values,
    })
  }

  /// Asset identifiers in column order (sorted).
  pub fn assets(&self) -> &[String] {
    &self.assets
  }

  pub fn n_assets(&self) -> usize {
    self.assets.len()
  }

  pub fn n_observations(&self) -> usize {
    self.values.nrows()
  }

  /// Borrow the raw `T x N` panel.
  pub fn values(&self) -> ArrayView2<'_, f64> {
    self.values.view()
  }

  /// Column position of `asset`, if present.
  pub fn index_of(&self, asset: &str) -> Option<usize> {
    self
      .assets
      .binary_search_by(|a| a.as_str().cmp(asset))
      .ok()
  }

  /// Return series of a single asset.
  pub fn column(&self, asset: &str) -> Option<ArrayView1<'_, f64>> {
    self.index_of(asset).map(|j| self.values.column(j))
  }

  /// Observation `t` across all assets, in column order.
  pub fn row(&self, t: usize) -> Option<ArrayView1<'_, f64>> {
    (t < self.n_observations()).then(|| self.values.index_axis(Axis(0), t))
  }
}

fn simple_returns(asset: &str, closes: &[f64]) -> Result<Vec<f64>> {
  if let Some(row) = closes.iter().position(|p| !(p.is_finite() && *p > 0.0)) {
    return Err(
      InputError::NonPositivePrice {
        asset: asset.to_string(),
        row,
      }
      .into(),
    );
  }
  Ok(closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect())
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;
  use crate::error::Error;

  #[test]
  fn columns_are_sorted_by_asset() {
    let m = ReturnMatrix::from_columns(vec![
      ("ZZZ", vec![0.03, 0.01]),
      ("AAA", vec![0.01, 0.02]),
      ("MMM", vec![0.02, -0.01]),
    ])
    .unwrap();

    assert_eq!(m.assets(), &["AAA", "MMM", "ZZZ"]);
    assert_eq!(m.n_observations(), 2);
    assert_eq!(m.column("ZZZ").unwrap().to_vec(), vec![0.03, 0.01]);
    assert_eq!(m.row(1).unwrap().to_vec(), vec![0.02, -0.01, 0.01]);
    assert!(m.row(2).is_none());
    assert!(m.index_of("QQQ").is_none());
  }

  #[test]
  fn rows_and_columns_build_the_same_matrix() {
    let by_rows = ReturnMatrix::from_rows(vec![
      vec![("B", 0.01), ("A", 0.02)],
      vec![("A", -0.01), ("B", 0.03)],
      vec![("B", 0.0), ("A", 0.005)],
    ])
    .unwrap();
    let by_cols = ReturnMatrix::from_columns(vec![
      ("A", vec![0.02, -0.01, 0.005]),
      ("B", vec![0.01, 0.03, 0.0]),
    ])
    .unwrap();

    assert_eq!(by_rows, by_cols);
  }

  #[test]
  fn inconsistent_rows_report_offending_assets() {
    let err = ReturnMatrix::from_rows(vec![
      vec![("A", 0.01), ("B", 0.02)],
      vec![("A", 0.01), ("B", 0.02)],
      vec![("A", 0.01), ("C", 0.02)],
    ])
    .unwrap_err();

    assert_eq!(
      err,
      Error::InvalidInput(InputError::InconsistentAssets {
        row: 2,
        missing: vec!["B".to_string()],
        unexpected: vec!["C".to_string()],
      })
    );
  }

  #[test]
  fn rejects_degenerate_shapes() {
    let empty: Vec<(&str, Vec<f64>)> = Vec::new();
    assert_eq!(
      ReturnMatrix::from_columns(empty).unwrap_err().input(),
      &InputError::NoAssets
    );

    assert_eq!(
      ReturnMatrix::from_columns(vec![("A", vec![0.01])])
        .unwrap_err()
        .input(),
      &InputError::TooFewObservations {
        observations: 1,
        required: 2
      }
    );

    assert!(matches!(
      ReturnMatrix::from_columns(vec![("A", vec![0.01, 0.02]), ("B", vec![0.01])])
        .unwrap_err()
        .input(),
      InputError::LengthMismatch { asset, expected: 2, found: 1 } if asset == "B"
    ));

    assert_eq!(
      ReturnMatrix::from_columns(vec![("A", vec![0.01, 0.02]), ("A", vec![0.0, 0.0])])
        .unwrap_err()
        .input(),
      &InputError::DuplicateAsset("A".to_string())
    );
  }

  #[test]
  fn duplicate_asset_within_a_row_is_rejected() {
    let err = ReturnMatrix::from_rows(vec![
      vec![("A", 0.01), ("B", 0.02)],
      vec![("A", 0.01), ("A", 0.03)],
    ])
    .unwrap_err();

    assert_eq!(err.input(), &InputError::DuplicateAsset("A".to_string()));
  }

  #[test]
  fn rejects_non_finite_returns() {
    let err = ReturnMatrix::from_columns(vec![("A", vec![0.01, f64::NAN, 0.0])]).unwrap_err();
    assert_eq!(
      err.input(),
      &InputError::NonFiniteReturn {
        asset: "A".to_string(),
        row: 1
      }
    );
  }

  #[test]
  fn prices_become_simple_returns() {
    let m = ReturnMatrix::from_prices(vec![("A", vec![100.0, 110.0, 99.0])]).unwrap();
    let col = m.column("A").unwrap();

    assert_eq!(m.n_observations(), 2);
    assert_abs_diff_eq!(col[0], 0.1, epsilon = 1e-15);
    assert_abs_diff_eq!(col[1], -0.1, epsilon = 1e-15);

    let err = ReturnMatrix::from_prices(vec![("A", vec![100.0, 0.0, 99.0])]).unwrap_err();
    assert_eq!(
      err.input(),
      &InputError::NonPositivePrice {
        asset: "A".to_string(),
        row: 1
      }
    );
  }
}
