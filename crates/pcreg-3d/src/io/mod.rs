/// HDF5 shape archive reader module (feature-gated).
///
/// Requires the `hdf5` feature flag and the system HDF5 library.
#[cfg(feature = "hdf5")]
pub mod h5;

/// KITTI velodyne scan reader module.
pub mod kitti;

/// Numpy archive reader module.
pub mod npz;

/// PLY reader module.
pub mod ply;
