use std::path::Path;

use crate::pointcloud::PointCloud;

/// Error types for the HDF5 module.
#[derive(Debug, thiserror::Error)]
pub enum Hdf5Error {
    /// Failed to open or read the file
    #[error("Failed to read HDF5 file: {0}")]
    Hdf5(#[from] hdf5::Error),

    /// The `data` dataset is not `B x N x 3`
    #[error("Dataset `data` has shape {0:?}, expected (B, N, 3)")]
    DataShape(Vec<usize>),

    /// The `label` dataset does not hold one label per shape
    #[error("Got {shapes} shapes but {labels} labels")]
    LabelMismatch {
        /// Number of shapes.
        shapes: usize,
        /// Number of labels.
        labels: usize,
    },
}

/// Shapes and category labels of one HDF5 partition file.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledShapes {
    /// One cloud per shape.
    pub clouds: Vec<PointCloud>,
    /// Category label of every shape.
    pub labels: Vec<u32>,
}

/// Read a ModelNet40 partition file.
///
/// The file holds a `data` dataset of `B x N x 3` coordinates and a `label`
/// dataset of `B` (or `B x 1`) category indices.
pub fn read_hdf5_shapes(path: impl AsRef<Path>) -> Result<LabeledShapes, Hdf5Error> {
    let file = hdf5::File::open(path)?;

    let data = file.dataset("data")?;
    let shape = data.shape();
    if shape.len() != 3 || shape[2] != 3 {
        return Err(Hdf5Error::DataShape(shape));
    }
    let coords = data.read_raw::<f32>()?;
    let labels = file.dataset("label")?.read_raw::<u32>()?;

    let (num_shapes, num_points) = (shape[0], shape[1]);
    if labels.len() != num_shapes {
        return Err(Hdf5Error::LabelMismatch {
            shapes: num_shapes,
            labels: labels.len(),
        });
    }

    let stride = 3 * num_points;
    let clouds = (0..num_shapes)
        .map(|b| {
            let points = coords[b * stride..(b + 1) * stride]
                .chunks_exact(3)
                .map(|p| [p[0] as f64, p[1] as f64, p[2] as f64])
                .collect();
            PointCloud::new(points, None, None)
        })
        .collect();

    Ok(LabeledShapes { clouds, labels })
}
