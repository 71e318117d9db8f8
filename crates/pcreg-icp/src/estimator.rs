use pcreg_3d::{pointcloud::PointCloud, transforms::RigidTransform};

use crate::IcpError;

/// Result of a registration.
///
/// The transformation maps the source frame onto the target frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationResult {
    /// Estimated source to target transform.
    pub transform: RigidTransform,
    /// Number of iterations performed.
    pub num_iterations: usize,
    /// Root mean squared distance of the last correspondence set.
    pub rmse: f64,
    /// Fraction of source points with a correspondence in the last iteration.
    pub fitness: f64,
}

impl RegistrationResult {
    /// The estimate as a 4x4 homogeneous matrix.
    pub fn to_homogeneous(&self) -> [[f64; 4]; 4] {
        self.transform.to_homogeneous()
    }
}

/// Anything that estimates the rigid transform aligning `source` onto `target`.
pub trait RegistrationEstimator {
    /// Estimate the source to target transform.
    fn estimate(
        &self,
        source: &PointCloud,
        target: &PointCloud,
    ) -> Result<RegistrationResult, IcpError>;
}
