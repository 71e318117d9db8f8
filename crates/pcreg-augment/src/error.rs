use std::path::PathBuf;

#[cfg(feature = "hdf5")]
use pcreg_3d::io::h5::Hdf5Error;
use pcreg_3d::{
    io::{kitti::KittiError, npz::NpzError, ply::PlyError},
    pointcloud::PointCloudError,
};

use crate::source::Split;

/// Errors raised while turning a point cloud into a registration sample.
#[derive(Debug, thiserror::Error)]
pub enum AugmentError {
    /// The input cloud has no points.
    #[error("Cannot augment an empty point cloud")]
    EmptyPointCloud,

    /// The input cloud contains a NaN or infinite coordinate.
    #[error("Point {index} has a non-finite coordinate")]
    NonFinitePoint {
        /// Index of the offending point.
        index: usize,
    },

    /// A configuration value is outside its valid range.
    #[error("Invalid augmentation config `{field}`: {reason}")]
    InvalidConfig {
        /// Name of the configuration field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// More points were requested than the cloud holds.
    #[error("Cannot subsample {requested} points out of {available}")]
    SubsampleOutOfRange {
        /// Requested number of points.
        requested: usize,
        /// Number of points available at the subsampling step.
        available: usize,
    },
}

/// Errors raised by dataset sources and loaders.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// Filesystem error while indexing or reading a dataset.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed PLY file.
    #[error(transparent)]
    Ply(#[from] PlyError),

    /// Malformed KITTI scan.
    #[error(transparent)]
    Kitti(#[from] KittiError),

    /// Malformed numpy archive.
    #[error(transparent)]
    Npz(#[from] NpzError),

    /// Malformed HDF5 shape archive.
    #[cfg(feature = "hdf5")]
    #[error(transparent)]
    Hdf5(#[from] Hdf5Error),

    /// The dataset layout needs a cargo feature that is not enabled.
    #[error("Reading this dataset requires the `{0}` feature")]
    FeatureDisabled(&'static str),

    /// Invalid point cloud.
    #[error(transparent)]
    PointCloud(#[from] PointCloudError),

    /// Augmentation failed.
    #[error(transparent)]
    Augment(#[from] AugmentError),

    /// Malformed JSON configuration.
    #[error("Invalid configuration file: {0}")]
    Config(#[from] serde_json::Error),

    /// Index past the end of the dataset.
    #[error("Index {index} out of range for dataset of length {len}")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Dataset length.
        len: usize,
    },

    /// No files were found for the requested split.
    #[error("No point clouds found under {0}")]
    EmptySplit(PathBuf),

    /// The dataset does not define the requested split.
    #[error("Dataset {dataset} has no {split} split")]
    UnknownSplit {
        /// Dataset name.
        dataset: &'static str,
        /// Requested split.
        split: Split,
    },

    /// Unrecognized dataset or split name.
    #[error("Unknown name: {0}")]
    UnknownName(String),

    /// Cloud and label arrays have different lengths.
    #[error("Got {clouds} point clouds but {labels} labels")]
    LabelMismatch {
        /// Number of clouds.
        clouds: usize,
        /// Number of labels.
        labels: usize,
    },

    /// A batch must hold at least one sample.
    #[error("Batch size must be at least 1")]
    InvalidBatchSize,

    /// Samples of a batch have different point counts.
    #[error("Cannot collate samples with {expected} and {actual} points")]
    RaggedBatch {
        /// Point count of the first sample.
        expected: usize,
        /// Point count of the mismatching sample.
        actual: usize,
    },
}
