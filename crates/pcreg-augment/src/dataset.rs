use rand::Rng;
use serde::{Deserialize, Serialize};

use pcreg_3d::{ops, pointcloud::PointCloud};

use crate::{
    augment, AugmentConfig, DatasetError, DatasetKind, DatasetSource, PointCloudSource, Sample,
};

/// How many points of a loaded cloud reach the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointSelection {
    /// Keep every point.
    All,
    /// Keep the first `n` points.
    Truncate(usize),
    /// Draw `n` point indices uniformly with replacement.
    Resample(usize),
}

/// Per-source preparation of a loaded cloud before augmentation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preprocess {
    /// Point selection, applied last.
    pub selection: PointSelection,
    /// Subtract the centroid.
    pub center: bool,
    /// Centre and scale into the unit sphere.
    pub normalize: bool,
}

impl Default for Preprocess {
    fn default() -> Self {
        Self {
            selection: PointSelection::All,
            center: false,
            normalize: false,
        }
    }
}

impl Preprocess {
    /// The usual preparation of each dataset.
    pub fn for_kind(kind: DatasetKind) -> Self {
        match kind {
            DatasetKind::ModelNet40 => Self {
                selection: PointSelection::Truncate(1024),
                ..Default::default()
            },
            DatasetKind::ThreeDMatch => Self {
                selection: PointSelection::Resample(2048),
                ..Default::default()
            },
            DatasetKind::KittiObject | DatasetKind::KittiTracking => Self {
                selection: PointSelection::Resample(2048),
                center: true,
                normalize: false,
            },
        }
    }

    /// Prepare a cloud, returning its xyz coordinates only.
    pub fn apply<R: Rng>(
        &self,
        pointcloud: &PointCloud,
        rng: &mut R,
    ) -> Result<PointCloud, DatasetError> {
        let mut cloud = pointcloud.xyz();
        if self.normalize {
            cloud = ops::normalize_unit_sphere(&cloud)?;
        } else if self.center {
            cloud = ops::center(&cloud)?.0;
        }

        Ok(match self.selection {
            PointSelection::All => cloud,
            PointSelection::Truncate(n) => cloud.truncate(n),
            PointSelection::Resample(n) => {
                if cloud.is_empty() {
                    return Err(pcreg_3d::pointcloud::PointCloudError::Empty.into());
                }
                let indices = (0..n)
                    .map(|_| rng.random_range(0..cloud.len()))
                    .collect::<Vec<_>>();
                cloud.select(&indices)
            }
        })
    }
}

/// A registration dataset: a point cloud source, its preparation and the augmentation.
///
/// Every access draws a fresh sample; the underlying clouds are never modified.
#[derive(Debug, Clone)]
pub struct RegistrationDataset<S: PointCloudSource = DatasetSource> {
    source: S,
    preprocess: Preprocess,
    config: AugmentConfig,
}

impl<S: PointCloudSource> RegistrationDataset<S> {
    /// Create a dataset, validating the augmentation configuration.
    pub fn new(source: S, preprocess: Preprocess, config: AugmentConfig) -> Result<Self, DatasetError> {
        config.validate()?;
        Ok(Self {
            source,
            preprocess,
            config,
        })
    }

    /// Number of clouds in the source.
    pub fn len(&self) -> usize {
        self.source.len()
    }

    /// Whether the source is empty.
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// The augmentation configuration.
    pub fn config(&self) -> &AugmentConfig {
        &self.config
    }

    /// The preparation applied before augmentation.
    pub fn preprocess(&self) -> &Preprocess {
        &self.preprocess
    }

    /// The underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Load, prepare and augment the cloud at `index`.
    pub fn get<R: Rng>(&self, index: usize, rng: &mut R) -> Result<Sample, DatasetError> {
        if index >= self.len() {
            return Err(DatasetError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        let cloud = self.source.load(index)?;
        let cloud = self.preprocess.apply(&cloud, rng)?;
        log::trace!("sampling item {index} with {} points", cloud.len());
        Ok(augment(&cloud, &self.config, rng)?)
    }
}

impl RegistrationDataset<DatasetSource> {
    /// Create a dataset with the usual preparation of its source.
    pub fn with_default_preprocess(
        source: DatasetSource,
        config: AugmentConfig,
    ) -> Result<Self, DatasetError> {
        let preprocess = Preprocess::for_kind(source.kind());
        Self::new(source, preprocess, config)
    }
}
