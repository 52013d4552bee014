//! # Portfolio
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Return panels, hierarchical clustering and long-only allocation.

pub mod baseline;
pub mod cluster;
pub mod engine;
pub mod hrp;
pub mod matrix;
pub mod returns;
pub mod stats;
pub mod weights;

pub use baseline::EqualWeightAllocator;
pub use baseline::InverseVolAllocator;
pub use cluster::ClusterTree;
pub use cluster::Linkage;
pub use cluster::Node;
pub use cluster::NodeId;
pub use engine::AllocationEngine;
pub use engine::AllocationEngineConfig;
pub use engine::AllocationMethod;
pub use engine::Evaluation;
pub use hrp::ClusterVariance;
pub use hrp::HrpAllocator;
pub use hrp::HrpConfig;
pub use hrp::HrpReport;
pub use matrix::correlation_matrix;
pub use matrix::covariance_matrix;
pub use matrix::distance_matrix;
pub use returns::ReturnMatrix;
pub use stats::PortfolioStats;
pub use stats::StatsConfig;
pub use stats::portfolio_returns;
pub use weights::WeightVector;
