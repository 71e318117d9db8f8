use std::path::Path;

use npyz::{npz::NpzArchive, DType, NpyFile, Order, TypeChar};

use crate::pointcloud::{PointCloud, PointCloudError};

/// Error types for the npz module.
#[derive(Debug, thiserror::Error)]
pub enum NpzError {
    /// Failed to read the archive
    #[error("Failed to read npz archive")]
    Io(#[from] std::io::Error),

    /// The archive has no array with this name
    #[error("Missing array `{0}`")]
    MissingArray(&'static str),

    /// The array element type cannot be read as a coordinate
    #[error("Array `{name}` has unsupported dtype {dtype}")]
    UnsupportedDtype {
        /// Name of the array.
        name: &'static str,
        /// The dtype found in the archive.
        dtype: String,
    },

    /// The array is not `N x 3`
    #[error("Array `{name}` has shape {shape:?}, expected (N, 3)")]
    Shape {
        /// Name of the array.
        name: &'static str,
        /// Shape found in the archive.
        shape: Vec<u64>,
    },

    /// Points and colors do not pair up
    #[error(transparent)]
    PointCloud(#[from] PointCloudError),
}

// values of an `N x 3` array and whether they came from an integer dtype
struct Rows {
    values: Vec<[f64; 3]>,
    integral: bool,
}

fn read_rows<R: std::io::Read>(name: &'static str, npy: NpyFile<R>) -> Result<Rows, NpzError> {
    let shape = npy.shape().to_vec();
    if shape.len() != 2 || shape[1] != 3 {
        return Err(NpzError::Shape { name, shape });
    }
    let order = npy.order();

    let (flat, integral) = match npy.dtype() {
        DType::Plain(ts) => match (ts.type_char(), ts.size_field()) {
            (TypeChar::Float, 4) => (to_f64(npy.into_vec::<f32>()?), false),
            (TypeChar::Float, 8) => (npy.into_vec::<f64>()?, false),
            (TypeChar::Uint, 1) => (to_f64(npy.into_vec::<u8>()?), true),
            _ => {
                return Err(NpzError::UnsupportedDtype {
                    name,
                    dtype: ts.to_string(),
                })
            }
        },
        other => {
            return Err(NpzError::UnsupportedDtype {
                name,
                dtype: format!("{other:?}"),
            })
        }
    };

    let n = shape[0] as usize;
    let values = (0..n)
        .map(|i| match order {
            Order::C => [flat[3 * i], flat[3 * i + 1], flat[3 * i + 2]],
            Order::Fortran => [flat[i], flat[n + i], flat[2 * n + i]],
        })
        .collect();

    Ok(Rows { values, integral })
}

fn to_f64<T: Into<f64>>(values: Vec<T>) -> Vec<f64> {
    values.into_iter().map(Into::into).collect()
}

fn to_color(rgb: &[f64; 3], integral: bool) -> [u8; 3] {
    let scale = if integral { 1.0 } else { 255.0 };
    rgb.map(|c| (c * scale).round().clamp(0.0, 255.0) as u8)
}

/// Read a scene fragment stored as a numpy archive.
///
/// The archive holds a `pcd` array of `N x 3` coordinates and an optional
/// `color` array of `N x 3` colors, either floats in `[0, 1]` or `uint8`.
/// Float32 and float64 coordinates are accepted.
pub fn read_npz_fragment(path: impl AsRef<Path>) -> Result<PointCloud, NpzError> {
    let mut archive = NpzArchive::open(path)?;

    let pcd = archive
        .by_name("pcd")?
        .ok_or(NpzError::MissingArray("pcd"))?;
    let points = read_rows("pcd", pcd)?.values;

    let colors = match archive.by_name("color")? {
        Some(npy) => {
            let rows = read_rows("color", npy)?;
            Some(
                rows.values
                    .iter()
                    .map(|c| to_color(c, rows.integral))
                    .collect(),
            )
        }
        None => None,
    };

    Ok(PointCloud::try_new(points, colors, None)?)
}
