//! # portfolio-opt
//!
//! $$
//! R \xrightarrow{\ \rho\ } D \xrightarrow{\ \text{linkage}\ } \mathcal T
//! \xrightarrow{\ \text{bisection}\ } \mathbf w
//! $$
//!
//! Hierarchical Risk Parity allocation over a panel of asset returns, with
//! naive baselines and in-sample statistics for comparison.
//!
//! ```ignore
//! use portfolio_opt::portfolio::HrpAllocator;
//! use portfolio_opt::portfolio::ReturnMatrix;
//!
//! let returns = ReturnMatrix::from_columns(vec![
//!   ("AAA", vec![0.01, -0.02, 0.015]),
//!   ("BBB", vec![0.004, 0.001, -0.003]),
//! ])?;
//! let weights = HrpAllocator::default().allocate(&returns)?;
//! ```

pub mod error;
pub mod portfolio;
pub mod traits;

pub use error::Error;
pub use error::InputError;
pub use error::Result;
