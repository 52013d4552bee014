//! # Hierarchical Clustering
//!
//! $$
//! d(k, l) = \alpha_i d(i, l) + \alpha_j d(j, l) + \gamma \lvert d(i, l) - d(j, l) \rvert,
//! \qquad k = i \cup j
//! $$
//!
//! Agglomerative clustering over a distance matrix, using the Lance-Williams
//! update. The resulting binary tree is stored as an arena: leaves `0..N` are
//! the assets in column order, merge `k` lives at `N + k`, the root is last.
//!
//! Among equally distant candidate pairs the one whose smallest member index
//! is lowest wins (then the second cluster's smallest index). Since assets are
//! sorted by identifier, this is the lexicographic tie-break on identifiers.

use std::fmt::Display;
use std::str::FromStr;

use ndarray::Array2;
use tracing::trace;

use crate::error::Error;
use crate::error::InputError;
use crate::error::Result;

/// Index of a node in a [`ClusterTree`].
pub type NodeId = usize;

/// Inter-cluster distance used while merging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Linkage {
  /// Nearest pair of members.
  #[default]
  Single,
  /// Size-weighted mean of member distances (UPGMA).
  Average,
  /// Farthest pair of members.
  Complete,
}

impl Linkage {
  fn update(self, d_il: f64, d_jl: f64, n_i: usize, n_j: usize) -> f64 {
    match self {
      Linkage::Single => d_il.min(d_jl),
      Linkage::Complete => d_il.max(d_jl),
      Linkage::Average => (n_i as f64 * d_il + n_j as f64 * d_jl) / (n_i + n_j) as f64,
    }
  }
}

impl Display for Linkage {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Linkage::Single => write!(f, "single"),
      Linkage::Average => write!(f, "average"),
      Linkage::Complete => write!(f, "complete"),
    }
  }
}

impl FromStr for Linkage {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_lowercase().as_str() {
      "single" | "min" => Ok(Self::Single),
      "average" | "avg" | "upgma" => Ok(Self::Average),
      "complete" | "max" => Ok(Self::Complete),
      _ => Err(
        InputError::UnknownMethod {
          kind: "linkage",
          value: s.to_string(),
        }
        .into(),
      ),
    }
  }
}

/// Node of a [`ClusterTree`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Node {
  /// A single asset, by column index.
  Leaf { asset: usize },
  /// Merge of two sub-clusters at linkage distance `distance`.
  Merge {
    left: NodeId,
    right: NodeId,
    distance: f64,
    size: usize,
  },
}

impl Node {
  /// Number of leaves under this node.
  pub fn size(&self) -> usize {
    match self {
      Node::Leaf { .. } => 1,
      Node::Merge { size, .. } => *size,
    }
  }
}

/// Immutable binary cluster tree.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterTree {
  nodes: Vec<Node>,
  n_leaves: usize,
  linkage: Linkage,
}

impl ClusterTree {
  /// Cluster `distance` (square, symmetric) with the given linkage.
  pub fn build(distance: &Array2<f64>, linkage: Linkage) -> Result<Self> {
    let n = distance.nrows();
    if distance.ncols() != n {
      return Err(
        InputError::NotSquare {
          rows: n,
          cols: distance.ncols(),
        }
        .into(),
      );
    }
    if n == 0 {
      return Err(InputError::NoAssets.into());
    }

    let mut nodes: Vec<Node> = (0..n).map(|asset| Node::Leaf { asset }).collect();
    nodes.reserve(n - 1);

    // Slot `i` holds the active cluster whose smallest member is `i`.
    let mut d = distance.clone();
    let mut active = vec![true; n];
    let mut node_id: Vec<NodeId> = (0..n).collect();
    let mut size = vec![1usize; n];

    for _ in 0..(n - 1) {
      let mut min_d = f64::INFINITY;
      let mut mi = usize::MAX;
      let mut mj = usize::MAX;

      for i in 0..n {
        if !active[i] {
          continue;
        }
        for j in (i + 1)..n {
          if !active[j] {
            continue;
          }
          // strict `<` keeps the first pair in (i, j) order on ties
          if d[[i, j]] < min_d || mi == usize::MAX {
            min_d = d[[i, j]];
            mi = i;
            mj = j;
          }
        }
      }

      let merged = Node::Merge {
        left: node_id[mi],
        right: node_id[mj],
        distance: min_d,
        size: size[mi] + size[mj],
      };
      trace!(
        left = node_id[mi],
        right = node_id[mj],
        distance = min_d,
        "merge clusters"
      );

      for k in 0..n {
        if !active[k] || k == mi || k == mj {
          continue;
        }
        let updated = linkage.update(d[[mi, k]], d[[mj, k]], size[mi], size[mj]);
        d[[mi, k]] = updated;
        d[[k, mi]] = updated;
      }

      node_id[mi] = nodes.len();
      size[mi] += size[mj];
      active[mj] = false;
      nodes.push(merged);
    }

    Ok(Self {
      nodes,
      n_leaves: n,
      linkage,
    })
  }

  pub fn n_leaves(&self) -> usize {
    self.n_leaves
  }

  pub fn linkage(&self) -> Linkage {
    self.linkage
  }

  pub fn root(&self) -> NodeId {
    self.nodes.len() - 1
  }

  /// Node `id`, `None` if it is not in the tree.
  pub fn node(&self, id: NodeId) -> Option<&Node> {
    self.nodes.get(id)
  }

  pub fn nodes(&self) -> &[Node] {
    &self.nodes
  }

  /// Left and right child of a merge node, `None` for a leaf or unknown id.
  pub fn children(&self, id: NodeId) -> Option<(NodeId, NodeId)> {
    match self.nodes.get(id)? {
      Node::Leaf { .. } => None,
      Node::Merge { left, right, .. } => Some((*left, *right)),
    }
  }

  /// Asset indices under `id`, left subtree first. Empty for an unknown id.
  pub fn leaves(&self, id: NodeId) -> Vec<usize> {
    let Some(start) = self.nodes.get(id) else {
      return Vec::new();
    };
    let mut out = Vec::with_capacity(start.size());
    let mut stack = vec![id];
    while let Some(node) = stack.pop() {
      match self.nodes[node] {
        Node::Leaf { asset } => out.push(asset),
        Node::Merge { left, right, .. } => {
          stack.push(right);
          stack.push(left);
        }
      }
    }
    out
  }

  /// Quasi-diagonal ordering: all leaves in tree order.
  pub fn order(&self) -> Vec<usize> {
    self.leaves(self.root())
  }
}
