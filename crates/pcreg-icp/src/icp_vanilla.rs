use kiddo::immutable::float::kdtree::ImmutableKdTree;
use serde::{Deserialize, Serialize};

use crate::{
    ops::{find_correspondences, fit_transformation, MIN_CORRESPONDENCES},
    IcpError, RegistrationEstimator, RegistrationResult,
};
use pcreg_3d::{linalg, ops::centroid, pointcloud::PointCloud, transforms::RigidTransform};

/// ICP parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcpConfig {
    /// Maximum number of iterations to perform.
    pub max_iterations: usize,
    /// Convergence tolerance as the difference in RMSE between two consecutive iterations.
    pub tolerance: f64,
    /// Correspondences farther apart than this are rejected, all are kept when `None`.
    pub max_correspondence_distance: Option<f64>,
    /// Initial source to target transform.
    pub initial: RigidTransform,
}

impl Default for IcpConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 1e-6,
            max_correspondence_distance: None,
            initial: RigidTransform::identity(),
        }
    }
}

impl IcpConfig {
    /// Check every bound, failing on the first invalid one.
    pub fn validate(&self) -> Result<(), IcpError> {
        if self.max_iterations == 0 {
            return Err(IcpError::InvalidConfig {
                field: "max_iterations",
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(IcpError::InvalidConfig {
                field: "tolerance",
                reason: format!("{} is not a finite value >= 0", self.tolerance),
            });
        }
        if let Some(d) = self.max_correspondence_distance {
            if d.is_nan() || d <= 0.0 {
                return Err(IcpError::InvalidConfig {
                    field: "max_correspondence_distance",
                    reason: format!("{d} is not > 0"),
                });
            }
        }
        if let Err(e) = RigidTransform::try_new(self.initial.rotation, self.initial.translation) {
            return Err(IcpError::InvalidConfig {
                field: "initial",
                reason: e.to_string(),
            });
        }
        Ok(())
    }
}

/// Iterative Closest Point (ICP) algorithm using point to point distance.
///
/// Both clouds are centred on their means before the iterations and the
/// translation is mapped back to the original frames afterwards.
///
/// # Arguments
///
/// * `source` - Source point cloud.
/// * `target` - Target point cloud.
/// * `config` - Iteration parameters and initial transform.
///
/// # Returns
///
/// The source to target transform, the number of iterations, the final RMSE
/// and the fitness.
pub fn icp_vanilla(
    source: &PointCloud,
    target: &PointCloud,
    config: &IcpConfig,
) -> Result<RegistrationResult, IcpError> {
    config.validate()?;

    if source.is_empty() || target.is_empty() {
        return Err(IcpError::EmptyPointCloud);
    }

    let src_mean = centroid(source.points()).map_err(|_| IcpError::EmptyPointCloud)?;
    let tgt_mean = centroid(target.points()).map_err(|_| IcpError::EmptyPointCloud)?;
    let center = |points: &[[f64; 3]], mean: &[f64; 3]| {
        points
            .iter()
            .map(|p| [p[0] - mean[0], p[1] - mean[1], p[2] - mean[2]])
            .collect::<Vec<_>>()
    };
    let source_points = center(source.points(), &src_mean);
    let target_points = center(target.points(), &tgt_mean);

    // move the initial guess into the centred frames: t' = t + R * mu_src - mu_tgt
    let r_mean = linalg::mat33_mul_vec3(&config.initial.rotation, &src_mean);
    let mut estimate = RigidTransform {
        rotation: config.initial.rotation,
        translation: [
            config.initial.translation[0] + r_mean[0] - tgt_mean[0],
            config.initial.translation[1] + r_mean[1] - tgt_mean[1],
            config.initial.translation[2] + r_mean[2] - tgt_mean[2],
        ],
    };

    // build kdtree for target points to speed up the nearest neighbor search
    let kdtree: ImmutableKdTree<f64, u32, 3, 32> = ImmutableKdTree::new_from_slice(&target_points);

    let mut current_source = estimate.transform_points(&source_points);
    let mut num_iterations = 0;
    let mut rmse = f64::INFINITY;
    let mut fitness = 0.0;

    for i in 0..config.max_iterations {
        let matches = find_correspondences(
            &current_source,
            &target_points,
            &kdtree,
            config.max_correspondence_distance,
        );

        let found = matches.points_in_src.len();
        log::debug!("Iteration: {i}, correspondences: {found}");
        if found < MIN_CORRESPONDENCES {
            return Err(IcpError::NotEnoughCorrespondences {
                found,
                required: MIN_CORRESPONDENCES,
            });
        }

        // compute transformation between current source and closest points
        let delta = fit_transformation(&matches.points_in_src, &matches.points_in_dst)?;
        current_source = delta.transform_points(&current_source);
        estimate = delta.compose(&estimate);

        let current_rmse =
            (matches.sq_distances.iter().sum::<f64>() / found as f64).sqrt();
        fitness = found as f64 / source_points.len() as f64;
        num_iterations += 1;

        // check convergence and exit if below tolerance
        let converged = (rmse - current_rmse).abs() < config.tolerance;
        rmse = current_rmse;
        if converged {
            log::debug!("ICP converged in {num_iterations} iterations with error {rmse}");
            break;
        }
    }

    // back to the original frames: t = t' - R * mu_src + mu_tgt
    let r_mean = linalg::mat33_mul_vec3(&estimate.rotation, &src_mean);
    let transform = RigidTransform {
        rotation: estimate.rotation,
        translation: [
            estimate.translation[0] - r_mean[0] + tgt_mean[0],
            estimate.translation[1] - r_mean[1] + tgt_mean[1],
            estimate.translation[2] - r_mean[2] + tgt_mean[2],
        ],
    };

    Ok(RegistrationResult {
        transform,
        num_iterations,
        rmse,
        fitness,
    })
}

/// Point to point ICP as a [`RegistrationEstimator`].
#[derive(Debug, Clone, Default)]
pub struct IcpEstimator {
    /// Iteration parameters.
    pub config: IcpConfig,
}

impl IcpEstimator {
    /// Create an estimator with the given parameters.
    pub fn new(config: IcpConfig) -> Self {
        Self { config }
    }
}

impl RegistrationEstimator for IcpEstimator {
    fn estimate(
        &self,
        source: &PointCloud,
        target: &PointCloud,
    ) -> Result<RegistrationResult, IcpError> {
        icp_vanilla(source, target, &self.config)
    }
}
