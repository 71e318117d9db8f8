use rand::{seq::SliceRandom, Rng};

use pcreg_3d::{pointcloud::PointCloud, transforms::RigidTransform};

use crate::{noise, outliers, subsample, AugmentConfig, AugmentError};

/// A registration training pair.
///
/// `target = R * source + t` for the sampled forward transform `(R, t)`; the
/// stored rotation and translation are the inverse, mapping the target back
/// onto the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Transformed cloud, `N x 3`.
    pub target: Vec<[f32; 3]>,
    /// Source cloud, `N x 3`.
    pub source: Vec<[f32; 3]>,
    /// Inverse rotation `R^T`, row-major.
    pub rotation_inv: [[f32; 3]; 3],
    /// Inverse translation `-R^T t`.
    pub translation_inv: [f32; 3],
    /// Forward Euler angles in radians, ordered `[z, y, x]`.
    pub euler: [f32; 3],
    /// `{0, 1}` mask over the target: genuine (not an outlier) and retained by subsampling.
    ///
    /// With subsampling enabled it indexes the target as it was before subsampling.
    pub mask: Vec<u8>,
}

impl Sample {
    /// The target cloud as a flat `3 x N` array, one row per coordinate.
    pub fn target_channels_first(&self) -> Vec<f32> {
        channels_first(&self.target)
    }

    /// The source cloud as a flat `3 x N` array, one row per coordinate.
    pub fn source_channels_first(&self) -> Vec<f32> {
        channels_first(&self.source)
    }

    /// The inverse transform in double precision.
    pub fn inverse_transform(&self) -> RigidTransform {
        let r = &self.rotation_inv;
        let t = &self.translation_inv;
        RigidTransform {
            rotation: [
                [r[0][0] as f64, r[0][1] as f64, r[0][2] as f64],
                [r[1][0] as f64, r[1][1] as f64, r[1][2] as f64],
                [r[2][0] as f64, r[2][1] as f64, r[2][2] as f64],
            ],
            translation: [t[0] as f64, t[1] as f64, t[2] as f64],
        }
    }

    /// Number of genuine points flagged in the mask.
    pub fn num_valid(&self) -> usize {
        self.mask.iter().filter(|&&m| m == 1).count()
    }
}

fn channels_first(points: &[[f32; 3]]) -> Vec<f32> {
    let n = points.len();
    let mut out = vec![0.0; 3 * n];
    for (i, p) in points.iter().enumerate() {
        out[i] = p[0];
        out[n + i] = p[1];
        out[2 * n + i] = p[2];
    }
    out
}

fn to_f32(points: &[[f64; 3]]) -> Vec<[f32; 3]> {
    points
        .iter()
        .map(|p| [p[0] as f32, p[1] as f32, p[2] as f32])
        .collect()
}

/// Draw a forward rigid transform.
///
/// The angles `x, y, z` are uniform in `[-max_angle, max_angle]` and composed as
/// `Rx * Ry * Rz`; every translation component is uniform in
/// `[-max_translation, max_translation]`. Returns the transform and the angles
/// ordered `[z, y, x]`.
pub fn sample_rigid_transform<R: Rng>(
    config: &AugmentConfig,
    rng: &mut R,
) -> (RigidTransform, [f64; 3]) {
    let a = config.max_angle_rad();
    let anglex = rng.random_range(-a..=a);
    let angley = rng.random_range(-a..=a);
    let anglez = rng.random_range(-a..=a);

    let t = config.max_translation;
    let translation = [
        rng.random_range(-t..=t),
        rng.random_range(-t..=t),
        rng.random_range(-t..=t),
    ];

    (
        RigidTransform::from_euler_xyz([anglex, angley, anglez], translation),
        [anglez, angley, anglex],
    )
}

/// Turn one point cloud into a registration training pair.
///
/// Steps, in order: optional jitter of the source, rotation and translation
/// sampling, independent shuffling of source and target, transform
/// application, optional outlier injection on the target and optional
/// nearest-neighbour subsampling of the target. Only the xyz coordinates of
/// the input are used.
///
/// Example:
///
/// ```
/// use pcreg_3d::pointcloud::PointCloud;
/// use pcreg_augment::{augment, AugmentConfig, SampleRng};
///
/// let cloud = PointCloud::new(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], None, None);
/// let mut rng = SampleRng::new(0);
/// let sample = augment(&cloud, &AugmentConfig::default(), &mut rng).unwrap();
/// assert_eq!(sample.target.len(), 3);
/// assert_eq!(sample.mask, vec![1, 1, 1]);
/// ```
pub fn augment<R: Rng>(
    pointcloud: &PointCloud,
    config: &AugmentConfig,
    rng: &mut R,
) -> Result<Sample, AugmentError> {
    config.validate()?;

    if pointcloud.is_empty() {
        return Err(AugmentError::EmptyPointCloud);
    }
    if let Some(index) = pointcloud
        .points()
        .iter()
        .position(|p| p.iter().any(|v| !v.is_finite()))
    {
        return Err(AugmentError::NonFinitePoint { index });
    }

    // fail before drawing anything if the subsample cannot be satisfied
    let available = pointcloud
        .len()
        .checked_add(config.outliers.map_or(0, |o| o.count))
        .ok_or_else(|| AugmentError::InvalidConfig {
            field: "outliers.count",
            reason: format!("too many outliers for a cloud of {} points", pointcloud.len()),
        })?;
    if let Some(k) = config.num_subsampled_points {
        if k > available {
            return Err(AugmentError::SubsampleOutOfRange {
                requested: k,
                available,
            });
        }
    }

    let mut source = pointcloud.points().to_vec();
    if let Some(jitter) = &config.noise {
        noise::jitter_points(&mut source, jitter, rng);
    }

    let (transform, euler) = sample_rigid_transform(config, rng);
    let inverse = transform.inverse();

    if config.shuffle {
        source.shuffle(rng);
    }

    let mut target = transform.transform_points(&source);
    if config.shuffle {
        target.shuffle(rng);
    }

    let mut mask = vec![1u8; target.len()];

    if let Some(outlier_config) = &config.outliers {
        (target, mask) = outliers::add_outliers(target, mask, outlier_config, rng);
    }

    if let Some(k) = config.num_subsampled_points {
        let (indices, retained) = subsample::knn_subsample(&target, k, rng)?;
        target = indices.iter().map(|&i| target[i]).collect();
        mask = mask.iter().zip(retained).map(|(&m, r)| m & r).collect();
    }

    log::trace!(
        "augmented {} points into {} target points, euler zyx = {:?}",
        pointcloud.len(),
        target.len(),
        euler
    );

    let r = &inverse.rotation;
    let t = &inverse.translation;
    Ok(Sample {
        target: to_f32(&target),
        source: to_f32(&source),
        rotation_inv: [
            [r[0][0] as f32, r[0][1] as f32, r[0][2] as f32],
            [r[1][0] as f32, r[1][1] as f32, r[1][2] as f32],
            [r[2][0] as f32, r[2][1] as f32, r[2][2] as f32],
        ],
        translation_inv: [t[0] as f32, t[1] as f32, t[2] as f32],
        euler: [euler[0] as f32, euler[1] as f32, euler[2] as f32],
        mask,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OutlierConfig, SampleRng};
    use approx::assert_relative_eq;
    use pcreg_3d::linalg;

    fn grid_cloud(n: usize) -> PointCloud {
        let points = (0..n)
            .map(|i| {
                let x = i as f64;
                [(x * 0.37).sin(), (x * 0.11).cos(), (x * 0.05).sin() * 0.5]
            })
            .collect();
        PointCloud::new(points, None, None)
    }

    #[test]
    fn test_sample_rigid_transform_bounds() {
        let mut rng = SampleRng::new(1);
        let config = AugmentConfig::default();
        for _ in 0..200 {
            let (tf, euler) = sample_rigid_transform(&config, &mut rng);
            let rrt = linalg::matmul33(&tf.rotation, &linalg::transpose33(&tf.rotation));
            for i in 0..3 {
                for j in 0..3 {
                    assert_relative_eq!(rrt[i][j], if i == j { 1.0 } else { 0.0 }, epsilon = 1e-12);
                }
                assert!(tf.translation[i].abs() <= 1.0);
                assert!(euler[i].abs() <= config.max_angle_rad());
            }
            assert_relative_eq!(linalg::det33(&tf.rotation), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_zero_bounds_give_identity() -> Result<(), AugmentError> {
        let mut rng = SampleRng::new(2);
        let config = AugmentConfig {
            max_angle_deg: 0.0,
            max_translation: 0.0,
            shuffle: false,
            ..Default::default()
        };
        let cloud = grid_cloud(16);
        let sample = augment(&cloud, &config, &mut rng)?;
        assert_eq!(sample.source, sample.target);
        assert_eq!(sample.translation_inv, [0.0; 3]);
        Ok(())
    }

    #[test]
    fn test_unshuffled_pair_is_exact() -> Result<(), AugmentError> {
        let mut rng = SampleRng::new(3);
        let config = AugmentConfig {
            shuffle: false,
            ..Default::default()
        };
        let sample = augment(&grid_cloud(64), &config, &mut rng)?;
        let inv = sample.inverse_transform();
        for (t, s) in sample.target.iter().zip(sample.source.iter()) {
            let back = inv.apply(&[t[0] as f64, t[1] as f64, t[2] as f64]);
            for i in 0..3 {
                assert_relative_eq!(back[i], s[i] as f64, epsilon = 1e-4);
            }
        }
        Ok(())
    }

    #[test]
    fn test_empty_and_non_finite() {
        let mut rng = SampleRng::new(0);
        let config = AugmentConfig::default();
        let empty = PointCloud::new(vec![], None, None);
        assert!(matches!(
            augment(&empty, &config, &mut rng),
            Err(AugmentError::EmptyPointCloud)
        ));

        let nan = PointCloud::new(vec![[0.0; 3], [f64::NAN, 0.0, 0.0]], None, None);
        assert!(matches!(
            augment(&nan, &config, &mut rng),
            Err(AugmentError::NonFinitePoint { index: 1 })
        ));
    }

    #[test]
    fn test_subsample_out_of_range() {
        let mut rng = SampleRng::new(0);
        let config = AugmentConfig {
            num_subsampled_points: Some(11),
            ..Default::default()
        };
        assert!(matches!(
            augment(&grid_cloud(10), &config, &mut rng),
            Err(AugmentError::SubsampleOutOfRange {
                requested: 11,
                available: 10
            })
        ));

        // outliers count towards the available points
        let config = AugmentConfig {
            num_subsampled_points: Some(25),
            outliers: Some(OutlierConfig::default()),
            ..Default::default()
        };
        assert!(augment(&grid_cloud(10), &config, &mut rng).is_ok());
    }

    #[test]
    fn test_huge_outlier_count_is_rejected() {
        let mut rng = SampleRng::new(0);
        for subsample in [None, Some(3)] {
            let config = AugmentConfig {
                outliers: Some(OutlierConfig {
                    count: usize::MAX,
                    extent: 1.0,
                }),
                num_subsampled_points: subsample,
                ..Default::default()
            };
            assert!(matches!(
                augment(&grid_cloud(2), &config, &mut rng),
                Err(AugmentError::InvalidConfig {
                    field: "outliers.count",
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_outliers_and_subsample_mask() -> Result<(), AugmentError> {
        let mut rng = SampleRng::new(4);
        let config = AugmentConfig {
            outliers: Some(OutlierConfig::default()),
            num_subsampled_points: Some(50),
            ..Default::default()
        };
        let sample = augment(&grid_cloud(100), &config, &mut rng)?;
        assert_eq!(sample.target.len(), 50);
        assert_eq!(sample.source.len(), 100);
        assert_eq!(sample.mask.len(), 120);
        assert!(sample.num_valid() <= 50);
        Ok(())
    }

    #[test]
    fn test_channels_first_layout() {
        let sample = Sample {
            target: vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
            source: vec![[0.0; 3]; 2],
            rotation_inv: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            translation_inv: [0.0; 3],
            euler: [0.0; 3],
            mask: vec![1, 1],
        };
        assert_eq!(
            sample.target_channels_first(),
            vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]
        );
        assert_eq!(sample.source_channels_first().len(), 6);
    }
}
