use std::io::Read;
use std::path::Path;

use crate::pointcloud::PointCloud;

/// Number of f32 values stored per point: x, y, z and reflectance.
pub const KITTI_POINT_STRIDE: usize = 4;

/// Error types for the KITTI reader.
#[derive(Debug, thiserror::Error)]
pub enum KittiError {
    /// Failed to read the scan file
    #[error("Failed to read KITTI scan")]
    Io(#[from] std::io::Error),

    /// The file size is not a multiple of the point record size
    #[error("KITTI scan has {0} bytes, not a multiple of 16")]
    InvalidSize(usize),
}

/// Decode a velodyne scan from raw little-endian bytes.
///
/// Each point is stored as four f32 values; only the first three (xyz) are kept.
pub fn parse_kitti_scan(bytes: &[u8]) -> Result<PointCloud, KittiError> {
    let record = KITTI_POINT_STRIDE * std::mem::size_of::<f32>();
    if bytes.len() % record != 0 {
        return Err(KittiError::InvalidSize(bytes.len()));
    }

    let read_f32 = |chunk: &[u8]| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);

    let points = bytes
        .chunks_exact(record)
        .map(|rec| {
            [
                read_f32(&rec[0..4]) as f64,
                read_f32(&rec[4..8]) as f64,
                read_f32(&rec[8..12]) as f64,
            ]
        })
        .collect::<Vec<_>>();

    Ok(PointCloud::new(points, None, None))
}

/// Read a KITTI velodyne `.bin` scan.
pub fn read_kitti_bin(path: impl AsRef<Path>) -> Result<PointCloud, KittiError> {
    let mut file = std::fs::File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    parse_kitti_scan(&bytes)
}
