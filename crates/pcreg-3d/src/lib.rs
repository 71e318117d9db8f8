#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// I/O utilities for reading 3D data.
pub mod io;

/// Linear algebra utilities.
pub mod linalg;

/// Operations on 3D data processing.
pub mod ops;

/// Point cloud container.
pub mod pointcloud;

/// 3D transforms algorithms.
pub mod transforms;

mod utils;
