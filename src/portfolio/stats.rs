//! # Portfolio Statistics
//!
//! $$
//! r_{p,t} = \sum_i w_i r_{t,i},\qquad
//! \text{SR} = \frac{\bar r_p \, m - r_f}{s_p \sqrt m}
//! $$
//!
//! In-sample risk/return summary of a fixed-weight portfolio, `m` periods per
//! year. Returns are compounded as simple returns.

use ndarray::Array1;

use super::returns::ReturnMatrix;
use super::weights::WeightVector;
use crate::error::InputError;
use crate::error::Result;

/// Annualization and hurdle settings for [`PortfolioStats`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatsConfig {
  /// Observations per year, 252 for daily data.
  pub periods_per_year: f64,
  /// Annual risk-free rate subtracted in the Sharpe ratio.
  pub risk_free: f64,
}

impl Default for StatsConfig {
  fn default() -> Self {
    Self {
      periods_per_year: 252.0,
      risk_free: 0.0,
    }
  }
}

/// Summary statistics of a portfolio return series.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PortfolioStats {
  /// `prod(1 + r_t) - 1`.
  pub cumulative_return: f64,
  /// Mean period return times periods per year.
  pub annualized_return: f64,
  /// Sample standard deviation times `sqrt(periods per year)`.
  pub annualized_volatility: f64,
  /// `(annualized_return - risk_free) / annualized_volatility`, 0 when flat.
  pub sharpe: f64,
  /// Largest peak-to-trough loss of the wealth curve, as a positive fraction.
  pub max_drawdown: f64,
  pub periods: usize,
}

impl PortfolioStats {
  pub fn compute(
    returns: &ReturnMatrix,
    weights: &WeightVector,
    config: &StatsConfig,
  ) -> Result<Self> {
    let series = portfolio_returns(returns, weights)?;
    Ok(Self::from_series(&series, config))
  }

  /// Statistics of an already aggregated return series.
  pub fn from_series(series: &Array1<f64>, config: &StatsConfig) -> Self {
    let periods = series.len();
    if periods == 0 {
      return Self::default();
    }

    let mean = series.mean().unwrap_or(0.0);
    let sd = if periods > 1 { series.std(1.0) } else { 0.0 };

    let annualized_return = mean * config.periods_per_year;
    let annualized_volatility = sd * config.periods_per_year.sqrt();
    let sharpe = if annualized_volatility > 1e-15 {
      (annualized_return - config.risk_free) / annualized_volatility
    } else {
      0.0
    };

    let mut wealth = 1.0;
    let mut peak = 1.0;
    let mut max_drawdown = 0.0f64;
    for &r in series {
      wealth *= 1.0 + r;
      peak = f64::max(peak, wealth);
      max_drawdown = max_drawdown.max(1.0 - wealth / peak);
    }

    Self {
      cumulative_return: wealth - 1.0,
      annualized_return,
      annualized_volatility,
      sharpe,
      max_drawdown,
      periods,
    }
  }
}

/// Fixed-weight portfolio return per observation.
///
/// `weights` must cover exactly the assets of `returns`.
pub fn portfolio_returns(returns: &ReturnMatrix, weights: &WeightVector) -> Result<Array1<f64>> {
  if !weights.assets().eq(returns.assets().iter().map(String::as_str)) {
    return Err(
      InputError::AssetMismatch {
        expected: returns.assets().to_vec(),
        found: weights.assets().map(str::to_string).collect(),
      }
      .into(),
    );
  }

  let w = Array1::from(weights.to_vec());
  Ok(returns.values().dot(&w))
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;

  use super::*;
  use crate::error::Error;

  #[test]
  fn hand_computed_series() {
    let cfg = StatsConfig {
      periods_per_year: 4.0,
      risk_free: 0.0,
    };
    let s = PortfolioStats::from_series(&array![0.1, -0.2, 0.05, 0.05], &cfg);

    // wealth: 1.1, 0.88, 0.924, 0.9702
    assert_abs_diff_eq!(s.cumulative_return, -0.0298, epsilon = 1e-12);
    assert_abs_diff_eq!(s.max_drawdown, 0.2, epsilon = 1e-12);
    assert_abs_diff_eq!(s.annualized_return, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(s.sharpe, 0.0, epsilon = 1e-12);
    assert_eq!(s.periods, 4);

    // deviations 0.1, -0.2, 0.05, 0.05 => var = 0.055 / 3
    assert_abs_diff_eq!(s.annualized_volatility, (0.055f64 / 3.0).sqrt() * 2.0, epsilon = 1e-12);
  }

  #[test]
  fn weights_are_applied_column_wise() {
    let m =
      ReturnMatrix::from_columns(vec![("A", vec![0.02, 0.0]), ("B", vec![0.0, 0.04])]).unwrap();
    let w = WeightVector::normalized(vec![("A", 3.0), ("B", 1.0)]).unwrap();
    let series = portfolio_returns(&m, &w).unwrap();

    assert_abs_diff_eq!(series[0], 0.015, epsilon = 1e-15);
    assert_abs_diff_eq!(series[1], 0.01, epsilon = 1e-15);

    let s = PortfolioStats::compute(&m, &w, &StatsConfig::default()).unwrap();
    assert_abs_diff_eq!(s.cumulative_return, 1.015 * 1.01 - 1.0, epsilon = 1e-12);
    assert_eq!(s.max_drawdown, 0.0);
    assert!(s.sharpe > 0.0);
  }

  #[test]
  fn price_crash_loses_at_most_the_position() {
    let m = ReturnMatrix::from_prices(vec![("A", vec![100.0, 30.0, 30.0])]).unwrap();
    let w = WeightVector::normalized(vec![("A", 1.0)]).unwrap();
    let s = PortfolioStats::compute(&m, &w, &StatsConfig::default()).unwrap();

    assert_abs_diff_eq!(s.cumulative_return, -0.7, epsilon = 1e-12);
    assert_abs_diff_eq!(s.max_drawdown, 0.7, epsilon = 1e-12);
  }

  #[test]
  fn mismatched_assets_are_rejected() {
    let m =
      ReturnMatrix::from_columns(vec![("A", vec![0.02, 0.0]), ("B", vec![0.0, 0.04])]).unwrap();
    let w = WeightVector::normalized(vec![("A", 1.0), ("C", 1.0)]).unwrap();

    assert!(matches!(
      portfolio_returns(&m, &w),
      Err(Error::InvalidInput(InputError::AssetMismatch { .. }))
    ));
  }
}
