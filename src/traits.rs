//! # Traits
//!
//! $$
//! \mathcal A : R \in \mathbb R^{T \times N} \to \mathbf w \in \Delta^{N-1}
//! $$
//!

use crate::error::Result;
use crate::portfolio::EqualWeightAllocator;
use crate::portfolio::HrpAllocator;
use crate::portfolio::InverseVolAllocator;
use crate::portfolio::ReturnMatrix;
use crate::portfolio::WeightVector;

/// Anything that turns a return panel into long-only weights.
///
/// External policies (for example a trained RL agent) implement this to be
/// evaluated side by side with HRP.
pub trait Allocator {
  /// Short label used in logs and reports.
  fn name(&self) -> &'static str;

  fn allocate(&self, returns: &ReturnMatrix) -> Result<WeightVector>;
}

impl Allocator for HrpAllocator {
  fn name(&self) -> &'static str {
    "hrp"
  }

  fn allocate(&self, returns: &ReturnMatrix) -> Result<WeightVector> {
    HrpAllocator::allocate(self, returns)
  }
}

impl Allocator for InverseVolAllocator {
  fn name(&self) -> &'static str {
    "inverse-vol"
  }

  fn allocate(&self, returns: &ReturnMatrix) -> Result<WeightVector> {
    InverseVolAllocator::allocate(self, returns)
  }
}

impl Allocator for EqualWeightAllocator {
  fn name(&self) -> &'static str {
    "equal-weight"
  }

  fn allocate(&self, returns: &ReturnMatrix) -> Result<WeightVector> {
    EqualWeightAllocator::allocate(self, returns)
  }
}
