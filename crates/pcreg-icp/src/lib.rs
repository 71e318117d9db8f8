#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

mod error;
pub use error::IcpError;

mod estimator;
pub use estimator::{RegistrationEstimator, RegistrationResult};

mod icp_vanilla;
pub use icp_vanilla::*;

/// Evaluation of estimated transforms against the ground truth.
pub mod metrics;

mod ops;
pub use ops::fit_transformation;
