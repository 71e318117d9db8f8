#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Augmentation configuration.
pub mod config;

/// Registration dataset combining a source, preprocessing and augmentation.
pub mod dataset;

mod error;
pub use error::{AugmentError, DatasetError};

/// Parallel batch loading.
pub mod loader;

/// Clipped gaussian jitter.
pub mod noise;

/// Uniform outlier injection.
pub mod outliers;

/// Per-sample random streams.
pub mod rng;

/// The rigid-transform augmentation sampler.
pub mod sampler;

/// Point cloud sources for the supported datasets.
pub mod source;

/// Nearest-neighbour subsampling.
pub mod subsample;

pub use config::{AugmentConfig, JitterConfig, OutlierConfig};
pub use dataset::{PointSelection, Preprocess, RegistrationDataset};
pub use loader::{Batch, BatchLoader};
pub use rng::SampleRng;
pub use sampler::{augment, Sample};
pub use source::{
    DatasetKind, DatasetSource, Kitti, KittiVariant, ModelNet40, PointCloudSource, Split, ThreeDMatch,
};
