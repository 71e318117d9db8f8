use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{AugmentError, DatasetError};

/// Clipped gaussian jitter applied to every coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JitterConfig {
    /// Standard deviation of the gaussian noise.
    pub sigma: f64,
    /// Noise values are clipped to `[-clip, clip]`.
    pub clip: f64,
}

impl Default for JitterConfig {
    fn default() -> Self {
        Self {
            sigma: 0.05,
            clip: 0.05,
        }
    }
}

/// Upper bound on the number of outliers added to one cloud.
pub const MAX_OUTLIERS: usize = 1 << 20;

/// Uniform outliers appended to the target cloud.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierConfig {
    /// Number of outlier points.
    pub count: usize,
    /// Outliers are drawn from the cube `[-extent, extent]^3`.
    pub extent: f64,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            count: 20,
            extent: 1.0,
        }
    }
}

/// Parameters of the rigid-transform augmentation.
///
/// Example:
///
/// ```
/// use pcreg_augment::{AugmentConfig, OutlierConfig};
///
/// let config = AugmentConfig {
///     outliers: Some(OutlierConfig::default()),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// assert!((config.max_angle_rad() - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentConfig {
    /// Maximum absolute Euler angle per axis, in degrees.
    pub max_angle_deg: f64,
    /// Maximum absolute translation per axis.
    pub max_translation: f64,
    /// Gaussian jitter on the source cloud, disabled when `None`.
    pub noise: Option<JitterConfig>,
    /// Outlier injection on the target cloud, disabled when `None`.
    pub outliers: Option<OutlierConfig>,
    /// Subsample the target cloud to this many points, disabled when `None`.
    pub num_subsampled_points: Option<usize>,
    /// Permute the source and target point order independently.
    pub shuffle: bool,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            max_angle_deg: 45.0,
            max_translation: 1.0,
            noise: None,
            outliers: None,
            num_subsampled_points: None,
            shuffle: true,
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> AugmentError {
    AugmentError::InvalidConfig {
        field,
        reason: reason.into(),
    }
}

impl AugmentConfig {
    /// Read a configuration from a JSON file. Missing fields take their default value.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let file = std::fs::File::open(path)?;
        let config: AugmentConfig = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// The maximum angle converted to radians.
    pub fn max_angle_rad(&self) -> f64 {
        self.max_angle_deg.to_radians()
    }

    /// Check every bound, failing on the first invalid one.
    pub fn validate(&self) -> Result<(), AugmentError> {
        if !self.max_angle_deg.is_finite() || !(0.0..=180.0).contains(&self.max_angle_deg) {
            return Err(invalid(
                "max_angle_deg",
                format!("{} is not in [0, 180]", self.max_angle_deg),
            ));
        }
        if !self.max_translation.is_finite() || self.max_translation < 0.0 {
            return Err(invalid(
                "max_translation",
                format!("{} is not a finite value >= 0", self.max_translation),
            ));
        }
        if let Some(noise) = &self.noise {
            if !noise.sigma.is_finite() || noise.sigma < 0.0 {
                return Err(invalid("noise.sigma", format!("{} < 0", noise.sigma)));
            }
            if !noise.clip.is_finite() || noise.clip < 0.0 {
                return Err(invalid("noise.clip", format!("{} < 0", noise.clip)));
            }
        }
        if let Some(outliers) = &self.outliers {
            if outliers.count == 0 || outliers.count > MAX_OUTLIERS {
                return Err(invalid(
                    "outliers.count",
                    format!("{} is not in [1, {MAX_OUTLIERS}]", outliers.count),
                ));
            }
            if !outliers.extent.is_finite() || outliers.extent <= 0.0 {
                return Err(invalid(
                    "outliers.extent",
                    format!("{} is not a finite value > 0", outliers.extent),
                ));
            }
        }
        if self.num_subsampled_points == Some(0) {
            return Err(invalid("num_subsampled_points", "must be at least 1"));
        }
        Ok(())
    }
}
