//! # Allocation Engine
//!
//! $$
//! \mathbf{w}^\* = \mathcal A_{\text{method}}(R),\qquad
//! \text{stats} = S(R\,\mathbf w^\*)
//! $$
//!
//! Single entry point that selects an allocator and summarizes the result.

use std::fmt::Display;
use std::str::FromStr;

use tracing::info;

use super::baseline::EqualWeightAllocator;
use super::baseline::InverseVolAllocator;
use super::hrp::HrpAllocator;
use super::hrp::HrpConfig;
use super::returns::ReturnMatrix;
use super::stats::PortfolioStats;
use super::stats::StatsConfig;
use super::weights::WeightVector;
use crate::error::Error;
use crate::error::InputError;
use crate::error::Result;
use crate::traits::Allocator;

/// Supported allocation methods.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AllocationMethod {
  /// Hierarchical Risk Parity.
  #[default]
  Hrp,
  /// Weights proportional to inverse volatility.
  InverseVol,
  /// `1/N`.
  EqualWeight,
}

impl Display for AllocationMethod {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      AllocationMethod::Hrp => write!(f, "hrp"),
      AllocationMethod::InverseVol => write!(f, "inverse-vol"),
      AllocationMethod::EqualWeight => write!(f, "equal-weight"),
    }
  }
}

impl FromStr for AllocationMethod {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_lowercase().as_str() {
      "hrp" => Ok(Self::Hrp),
      "inv-vol" | "inverse-vol" | "invvol" => Ok(Self::InverseVol),
      "equal" | "equal-weight" | "1/n" => Ok(Self::EqualWeight),
      _ => Err(
        InputError::UnknownMethod {
          kind: "allocation method",
          value: s.to_string(),
        }
        .into(),
      ),
    }
  }
}

/// Runtime configuration for [`AllocationEngine`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AllocationEngineConfig {
  /// Allocator used by [`AllocationEngine::allocate`].
  pub method: AllocationMethod,
  /// HRP settings; also supplies the variance floor of inverse-vol.
  pub hrp: HrpConfig,
  /// Annualization used by [`AllocationEngine::evaluate`].
  pub stats: StatsConfig,
}

/// Weights together with their in-sample statistics.
#[derive(Clone, Debug)]
pub struct Evaluation {
  pub method: &'static str,
  pub weights: WeightVector,
  pub stats: PortfolioStats,
}

#[derive(Clone, Debug, Default)]
pub struct AllocationEngine {
  config: AllocationEngineConfig,
}

impl AllocationEngine {
  pub fn new(config: AllocationEngineConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &AllocationEngineConfig {
    &self.config
  }

  /// Allocator for the configured method.
  pub fn allocator(&self) -> Box<dyn Allocator> {
    self.allocator_for(self.config.method)
  }

  fn allocator_for(&self, method: AllocationMethod) -> Box<dyn Allocator> {
    match method {
      AllocationMethod::Hrp => Box::new(HrpAllocator::new(self.config.hrp)),
      AllocationMethod::InverseVol => Box::new(InverseVolAllocator {
        variance_floor: self.config.hrp.variance_floor,
      }),
      AllocationMethod::EqualWeight => Box::new(EqualWeightAllocator),
    }
  }

  pub fn allocate(&self, returns: &ReturnMatrix) -> Result<WeightVector> {
    self.allocator().allocate(returns)
  }

  /// Allocate with the configured method and summarize the result.
  pub fn evaluate(&self, returns: &ReturnMatrix) -> Result<Evaluation> {
    self.evaluate_with(self.allocator().as_ref(), returns)
  }

  /// Evaluate any allocator, including ones defined outside this crate.
  pub fn evaluate_with(
    &self,
    allocator: &dyn Allocator,
    returns: &ReturnMatrix,
  ) -> Result<Evaluation> {
    let weights = allocator.allocate(returns)?;
    let stats = PortfolioStats::compute(returns, &weights, &self.config.stats)?;
    info!(
      method = allocator.name(),
      sharpe = stats.sharpe,
      volatility = stats.annualized_volatility,
      max_drawdown = stats.max_drawdown,
      "evaluated allocation"
    );

    Ok(Evaluation {
      method: allocator.name(),
      weights,
      stats,
    })
  }

  /// Evaluate every built-in method on the same panel.
  pub fn compare(&self, returns: &ReturnMatrix) -> Result<Vec<Evaluation>> {
    [
      AllocationMethod::Hrp,
      AllocationMethod::InverseVol,
      AllocationMethod::EqualWeight,
    ]
    .into_iter()
    .map(|m| self.evaluate_with(self.allocator_for(m).as_ref(), returns))
    .collect()
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use tracing_test::traced_test;

  use super::*;

  struct AllInFirst;

  impl Allocator for AllInFirst {
    fn name(&self) -> &'static str {
      "all-in-first"
    }

    fn allocate(&self, returns: &ReturnMatrix) -> Result<WeightVector> {
      WeightVector::normalized(
        returns
          .assets()
          .iter()
          .enumerate()
          .map(|(i, a)| (a.clone(), if i == 0 { 1.0 } else { 0.0 })),
      )
    }
  }

  fn sample() -> ReturnMatrix {
    ReturnMatrix::from_columns(vec![
      ("A", vec![0.01, -0.005, 0.012, 0.003, -0.002]),
      ("B", vec![0.02, -0.01, 0.025, 0.004, -0.006]),
      ("C", vec![-0.004, 0.006, 0.001, -0.003, 0.002]),
    ])
    .unwrap()
  }

  #[test]
  fn method_parses_from_str() {
    assert_eq!("HRP".parse::<AllocationMethod>().unwrap(), AllocationMethod::Hrp);
    assert_eq!(
      "inv-vol".parse::<AllocationMethod>().unwrap(),
      AllocationMethod::InverseVol
    );
    assert_eq!(
      "1/n".parse::<AllocationMethod>().unwrap(),
      AllocationMethod::EqualWeight
    );
    assert!(matches!(
      "markowitz".parse::<AllocationMethod>().unwrap_err().input(),
      InputError::UnknownMethod { value, .. } if value == "markowitz"
    ));
  }

  #[test]
  fn default_engine_runs_hrp() {
    let engine = AllocationEngine::default();
    let m = sample();

    assert_eq!(engine.allocator().name(), "hrp");
    assert_eq!(
      engine.allocate(&m).unwrap(),
      HrpAllocator::default().allocate(&m).unwrap()
    );
  }

  #[test]
  fn evaluate_uses_the_configured_method() {
    let engine = AllocationEngine::new(AllocationEngineConfig {
      method: AllocationMethod::EqualWeight,
      ..AllocationEngineConfig::default()
    });
    let m = sample();
    let e = engine.evaluate(&m).unwrap();

    assert_eq!(e.method, "equal-weight");
    for asset in ["A", "B", "C"] {
      assert_abs_diff_eq!(e.weights.get(asset).unwrap(), 1.0 / 3.0, epsilon = 1e-12);
    }
    let expected = PortfolioStats::compute(&m, &e.weights, &StatsConfig::default()).unwrap();
    assert_abs_diff_eq!(e.stats.sharpe, expected.sharpe, epsilon = 1e-12);
    assert_eq!(e.stats.periods, 5);
  }

  #[traced_test]
  #[test]
  fn compare_covers_every_method() {
    let engine = AllocationEngine::default();
    let evaluations = engine.compare(&sample()).unwrap();

    let names: Vec<_> = evaluations.iter().map(|e| e.method).collect();
    assert_eq!(names, vec!["hrp", "inverse-vol", "equal-weight"]);
    for e in &evaluations {
      assert_abs_diff_eq!(e.weights.total(), 1.0, epsilon = 1e-9);
      assert_eq!(e.stats.periods, 5);
    }
    assert!(logs_contain("evaluated allocation"));
  }

  #[test]
  fn external_allocators_plug_in() {
    let engine = AllocationEngine::new(AllocationEngineConfig {
      method: AllocationMethod::EqualWeight,
      ..AllocationEngineConfig::default()
    });
    let m = sample();
    let e = engine.evaluate_with(&AllInFirst, &m).unwrap();

    assert_eq!(e.method, "all-in-first");
    assert_eq!(e.weights.get("A"), Some(1.0));
    let a = m.column("A").unwrap();
    let expected = a.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0;
    assert_abs_diff_eq!(e.stats.cumulative_return, expected, epsilon = 1e-12);
  }
}
