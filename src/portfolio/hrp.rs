//! # Hierarchical Risk Parity
//!
//! $$
//! \alpha = 1 - \frac{V_L}{V_L + V_R},\qquad
//! V_c = \tilde{\mathbf w}_c^\top \Sigma_c \tilde{\mathbf w}_c
//! $$
//!
//! Lopez de Prado's HRP: cluster assets on correlation distance, order them by
//! the tree, then split each node's budget between its two children inversely
//! to their cluster variance. No covariance inversion is involved.
//!
//! Defaults are fixed for reproducibility: single linkage and inverse-variance
//! weights inside each cluster.

use std::fmt::Display;
use std::str::FromStr;

use ndarray::Array2;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use super::cluster::ClusterTree;
use super::cluster::Linkage;
use super::cluster::Node;
use super::cluster::NodeId;
use super::matrix::correlation_matrix;
use super::matrix::covariance_matrix;
use super::matrix::distance_matrix;
use super::returns::ReturnMatrix;
use super::weights::WeightVector;
use crate::error::Error;
use crate::error::InputError;
use crate::error::Result;

/// Floor applied to variances before they enter a ratio.
pub const DEFAULT_VARIANCE_FLOOR: f64 = 1e-12;

/// How members are weighted when measuring a cluster's variance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClusterVariance {
  /// `1/n` for every member.
  EqualWeight,
  /// Proportional to `1/sigma_i^2`.
  #[default]
  InverseVariance,
}

impl Display for ClusterVariance {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ClusterVariance::EqualWeight => write!(f, "equal-weight"),
      ClusterVariance::InverseVariance => write!(f, "inverse-variance"),
    }
  }
}

impl FromStr for ClusterVariance {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_lowercase().as_str() {
      "equal" | "equal-weight" | "ew" => Ok(Self::EqualWeight),
      "inverse-variance" | "inv-var" | "ivp" => Ok(Self::InverseVariance),
      _ => Err(
        InputError::UnknownMethod {
          kind: "cluster variance",
          value: s.to_string(),
        }
        .into(),
      ),
    }
  }
}

/// Configuration for [`HrpAllocator`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HrpConfig {
  /// Linkage used to build the cluster tree.
  pub linkage: Linkage,
  /// Within-cluster weighting for the bisection variance.
  pub cluster_variance: ClusterVariance,
  /// Lower bound on any variance used in the bisection. Non-positive or
  /// non-finite values fall back to [`DEFAULT_VARIANCE_FLOOR`].
  pub variance_floor: f64,
}

impl Default for HrpConfig {
  fn default() -> Self {
    Self {
      linkage: Linkage::Single,
      cluster_variance: ClusterVariance::InverseVariance,
      variance_floor: DEFAULT_VARIANCE_FLOOR,
    }
  }
}

/// Weights plus the intermediate structures that produced them.
#[derive(Clone, Debug)]
pub struct HrpReport {
  pub weights: WeightVector,
  pub tree: ClusterTree,
  /// Assets in quasi-diagonal order.
  pub order: Vec<String>,
  pub correlation: Array2<f64>,
}

/// Hierarchical Risk Parity allocator.
#[derive(Clone, Debug, Default)]
pub struct HrpAllocator {
  config: HrpConfig,
}

impl HrpAllocator {
  pub fn new(config: HrpConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &HrpConfig {
    &self.config
  }

  /// Allocate weights across every asset of `returns`.
  pub fn allocate(&self, returns: &ReturnMatrix) -> Result<WeightVector> {
    Ok(self.allocate_report(returns)?.weights)
  }

  /// Allocate and keep the tree, ordering and correlation for inspection.
  pub fn allocate_report(&self, returns: &ReturnMatrix) -> Result<HrpReport> {
    let n = returns.n_assets();
    debug!(
      assets = n,
      observations = returns.n_observations(),
      linkage = %self.config.linkage,
      cluster_variance = %self.config.cluster_variance,
      "hrp allocation"
    );

    let cov = covariance_matrix(returns)?;
    let correlation = correlation_matrix(returns, &cov)?;
    let tree = ClusterTree::build(&distance_matrix(&correlation), self.config.linkage)?;

    let floor = self.floor();
    for (i, asset) in returns.assets().iter().enumerate() {
      if cov[[i, i]] <= floor {
        warn!(
          asset = %asset,
          variance = cov[[i, i]],
          "zero-variance asset, flooring its variance"
        );
      }
    }

    let mut raw = vec![1.0; n];
    self.bisect(&tree, tree.root(), &cov, &mut raw);

    let assets = returns.assets();
    let order = tree.order().into_iter().map(|i| assets[i].clone()).collect();
    let weights = WeightVector::from_parts(assets, &raw)?;

    Ok(HrpReport {
      weights,
      tree,
      order,
      correlation,
    })
  }

  fn floor(&self) -> f64 {
    let v = self.config.variance_floor;
    if v.is_finite() && v > 0.0 {
      v
    } else {
      DEFAULT_VARIANCE_FLOOR
    }
  }

  fn bisect(&self, tree: &ClusterTree, node: NodeId, cov: &Array2<f64>, weights: &mut [f64]) {
    let Some(&Node::Merge { left, right, .. }) = tree.node(node) else {
      return;
    };

    let left_assets = tree.leaves(left);
    let right_assets = tree.leaves(right);
    let var_left = self.cluster_variance(&left_assets, cov);
    let var_right = self.cluster_variance(&right_assets, cov);
    let floor = self.floor();
    // both sides riskless: share by member count so every leaf ends up equal
    let (alpha, beta) = if var_left <= floor && var_right <= floor {
      let total = (left_assets.len() + right_assets.len()) as f64;
      (
        left_assets.len() as f64 / total,
        right_assets.len() as f64 / total,
      )
    } else {
      let alpha = 1.0 - var_left / (var_left + var_right);
      (alpha, 1.0 - alpha)
    };

    trace!(node, var_left, var_right, alpha, "bisect");

    for &i in &left_assets {
      weights[i] *= alpha;
    }
    for &i in &right_assets {
      weights[i] *= beta;
    }

    self.bisect(tree, left, cov, weights);
    self.bisect(tree, right, cov, weights);
  }

  fn cluster_variance(&self, members: &[usize], cov: &Array2<f64>) -> f64 {
    let floor = self.floor();
    let w: Vec<f64> = match self.config.cluster_variance {
      ClusterVariance::EqualWeight => vec![1.0 / members.len() as f64; members.len()],
      ClusterVariance::InverseVariance => {
        let inv: Vec<f64> = members
          .iter()
          .map(|&i| 1.0 / cov[[i, i]].max(floor))
          .collect();
        let total: f64 = inv.iter().sum();
        inv.iter().map(|v| v / total).collect()
      }
    };

    let mut var = 0.0;
    for (a, &i) in members.iter().enumerate() {
      for (b, &j) in members.iter().enumerate() {
        var += w[a] * w[b] * cov[[i, j]];
      }
    }

    var.max(floor)
  }
}
