use serde::{Deserialize, Serialize};

use pcreg_3d::{linalg, ops::euclidean_distance, transforms::RigidTransform};

pub use pcreg_3d::transforms::rotation_matrix_to_euler_zyx;

/// Geodesic angle, in degrees, between two rotations.
///
/// Example:
///
/// ```
/// use pcreg_icp::metrics::rotation_error_deg;
///
/// let identity = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
/// assert_eq!(rotation_error_deg(&identity, &identity), 0.0);
/// ```
pub fn rotation_error_deg(r_est: &[[f64; 3]; 3], r_gt: &[[f64; 3]; 3]) -> f64 {
    let delta = linalg::matmul33(&linalg::transpose33(r_est), r_gt);
    let trace = delta[0][0] + delta[1][1] + delta[2][2];
    ((trace - 1.0) / 2.0).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Euclidean distance between two translations.
pub fn translation_error(t_est: &[f64; 3], t_gt: &[f64; 3]) -> f64 {
    euclidean_distance(t_est, t_gt)
}

/// Aggregated errors over a set of estimates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    /// Number of accumulated estimates.
    pub count: usize,
    /// Mean squared Euler angle error, in squared degrees.
    pub r_mse: f64,
    /// Root of `r_mse`, in degrees.
    pub r_rmse: f64,
    /// Mean absolute Euler angle error, in degrees.
    pub r_mae: f64,
    /// Mean squared translation component error.
    pub t_mse: f64,
    /// Root of `t_mse`.
    pub t_rmse: f64,
    /// Mean absolute translation component error.
    pub t_mae: f64,
    /// Mean geodesic rotation error, in degrees.
    pub mean_rotation_error_deg: f64,
    /// Mean Euclidean translation error.
    pub mean_translation_error: f64,
}

/// Running sums of the registration errors.
///
/// Rotation errors compare the `[z, y, x]` Euler angles in degrees; translation
/// errors compare the components. Means are taken over every component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationMetrics {
    count: usize,
    r_sq: f64,
    r_abs: f64,
    t_sq: f64,
    t_abs: f64,
    geodesic: f64,
    distance: f64,
}

impl RegistrationMetrics {
    /// Create empty accumulators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one estimate and its ground truth.
    pub fn accumulate(&mut self, estimate: &RigidTransform, ground_truth: &RigidTransform) {
        let euler_est = rotation_matrix_to_euler_zyx(&estimate.rotation);
        let euler_gt = rotation_matrix_to_euler_zyx(&ground_truth.rotation);
        for (a, b) in euler_est.iter().zip(euler_gt.iter()) {
            let d = (a - b).to_degrees();
            self.r_sq += d * d;
            self.r_abs += d.abs();
        }
        for (a, b) in estimate
            .translation
            .iter()
            .zip(ground_truth.translation.iter())
        {
            let d = a - b;
            self.t_sq += d * d;
            self.t_abs += d.abs();
        }
        self.geodesic += rotation_error_deg(&estimate.rotation, &ground_truth.rotation);
        self.distance += translation_error(&estimate.translation, &ground_truth.translation);
        self.count += 1;
    }

    /// Number of accumulated estimates.
    pub fn count(&self) -> usize {
        self.count
    }

    /// The means so far, all zero when nothing was accumulated.
    pub fn summary(&self) -> MetricsSummary {
        if self.count == 0 {
            return MetricsSummary {
                count: 0,
                r_mse: 0.0,
                r_rmse: 0.0,
                r_mae: 0.0,
                t_mse: 0.0,
                t_rmse: 0.0,
                t_mae: 0.0,
                mean_rotation_error_deg: 0.0,
                mean_translation_error: 0.0,
            };
        }
        let n = self.count as f64;
        let components = 3.0 * n;
        let r_mse = self.r_sq / components;
        let t_mse = self.t_sq / components;
        MetricsSummary {
            count: self.count,
            r_mse,
            r_rmse: r_mse.sqrt(),
            r_mae: self.r_abs / components,
            t_mse,
            t_rmse: t_mse.sqrt(),
            t_mae: self.t_abs / components,
            mean_rotation_error_deg: self.geodesic / n,
            mean_translation_error: self.distance / n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pcreg_3d::transforms::rotation_z;

    #[test]
    fn test_rotation_error_deg() {
        let r = rotation_z(30f64.to_radians());
        let identity = RigidTransform::identity().rotation;
        assert_relative_eq!(rotation_error_deg(&r, &identity), 30.0, epsilon = 1e-9);
        assert_relative_eq!(rotation_error_deg(&identity, &r), 30.0, epsilon = 1e-9);
        assert_relative_eq!(rotation_error_deg(&r, &r), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_perfect_estimate_is_zero() {
        let gt = RigidTransform::from_euler_xyz([0.1, -0.2, 0.3], [0.5, 0.0, -1.0]);
        let mut metrics = RegistrationMetrics::new();
        metrics.accumulate(&gt, &gt);
        metrics.accumulate(&gt, &gt);
        let summary = metrics.summary();
        assert_eq!(summary.count, 2);
        assert_relative_eq!(summary.r_mse, 0.0, epsilon = 1e-12);
        assert_relative_eq!(summary.t_mae, 0.0);
        assert_relative_eq!(summary.mean_rotation_error_deg, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_known_errors() {
        let gt = RigidTransform::identity();
        let est = RigidTransform::from_euler_xyz([0.0, 0.0, 3f64.to_radians()], [0.3, 0.0, -0.3]);
        let mut metrics = RegistrationMetrics::new();
        metrics.accumulate(&est, &gt);
        let summary = metrics.summary();

        // only the z angle differs: 9 deg^2 over 3 components
        assert_relative_eq!(summary.r_mse, 3.0, epsilon = 1e-9);
        assert_relative_eq!(summary.r_mae, 1.0, epsilon = 1e-9);
        assert_relative_eq!(summary.t_mse, 0.06, epsilon = 1e-12);
        assert_relative_eq!(summary.t_mae, 0.2, epsilon = 1e-12);
        assert_relative_eq!(summary.mean_rotation_error_deg, 3.0, epsilon = 1e-9);
        assert_relative_eq!(summary.mean_translation_error, 0.18f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(RegistrationMetrics::new().summary().r_rmse, 0.0);
    }
}
