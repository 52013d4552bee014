//! # Errors
//!
//! Every failure of the allocation core is an input-validation failure.
//! Numerical degeneracy (zero variance, perfectly correlated pairs) is floored
//! internally and never surfaces here.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error returned by every fallible operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
  #[error("invalid input: {0}")]
  InvalidInput(#[from] InputError),
}

impl Error {
  /// Borrow the underlying validation failure.
  pub fn input(&self) -> &InputError {
    match self {
      Error::InvalidInput(e) => e,
    }
  }
}

/// Why a return matrix, weight vector or method name was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
  #[error("return matrix has no assets")]
  NoAssets,

  #[error("need at least {required} observations, got {observations}")]
  TooFewObservations { observations: usize, required: usize },

  #[error("row {row} does not match the asset set (missing: {missing:?}, unexpected: {unexpected:?})")]
  InconsistentAssets {
    row: usize,
    missing: Vec<String>,
    unexpected: Vec<String>,
  },

  #[error("asset `{0}` appears more than once")]
  DuplicateAsset(String),

  #[error("series for `{asset}` has {found} observations, expected {expected}")]
  LengthMismatch {
    asset: String,
    expected: usize,
    found: usize,
  },

  #[error("non-finite return for `{asset}` at row {row}")]
  NonFiniteReturn { asset: String, row: usize },

  #[error("non-positive or non-finite price for `{asset}` at row {row}")]
  NonPositivePrice { asset: String, row: usize },

  #[error("correlation between `{first}` and `{second}` is not finite")]
  NonFiniteCorrelation { first: String, second: String },

  #[error("matrix must be square, got {rows}x{cols}")]
  NotSquare { rows: usize, cols: usize },

  #[error("weight for `{asset}` must be finite and non-negative, got {weight}")]
  InvalidWeight { asset: String, weight: f64 },

  #[error("weights sum to zero")]
  ZeroTotalWeight,

  #[error("weight vector covers {found:?}, return matrix covers {expected:?}")]
  AssetMismatch {
    expected: Vec<String>,
    found: Vec<String>,
  },

  #[error("unknown {kind} `{value}`")]
  UnknownMethod { kind: &'static str, value: String },
}
