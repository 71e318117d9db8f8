use crate::pointcloud::{PointCloud, PointCloudError};

/// Utility function to compute the Euclidean distance between two points.
///
/// Example:
/// ```
/// use pcreg_3d::ops::euclidean_distance;
///
/// let a = [1.0, 2.0, 3.0];
/// let b = [4.0, 6.0, 3.0];
/// assert_eq!(euclidean_distance(&a, &b), 5.0);
/// ```
pub fn euclidean_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    squared_distance(a, b).sqrt()
}

/// Squared Euclidean distance between two points.
#[inline]
pub fn squared_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}

/// Compute the centroid (mean point) of a set of points.
pub fn centroid(points: &[[f64; 3]]) -> Result<[f64; 3], PointCloudError> {
    if points.is_empty() {
        return Err(PointCloudError::Empty);
    }
    let sum = points.iter().fold([0.0; 3], |mut acc, p| {
        acc[0] += p[0];
        acc[1] += p[1];
        acc[2] += p[2];
        acc
    });
    let n = points.len() as f64;
    Ok([sum[0] / n, sum[1] / n, sum[2] / n])
}

/// Subtract the centroid from every point, returning the centred cloud and the centroid.
pub fn center(pointcloud: &PointCloud) -> Result<(PointCloud, [f64; 3]), PointCloudError> {
    let c = centroid(pointcloud.points())?;
    let points = pointcloud
        .points()
        .iter()
        .map(|p| [p[0] - c[0], p[1] - c[1], p[2] - c[2]])
        .collect();
    Ok((
        PointCloud::new(
            points,
            pointcloud.colors().map(|c| c.to_vec()),
            pointcloud.normals().map(|n| n.to_vec()),
        ),
        c,
    ))
}

/// Centre the cloud and scale it so the furthest point lies on the unit sphere.
///
/// A cloud whose points all coincide is only centred.
pub fn normalize_unit_sphere(pointcloud: &PointCloud) -> Result<PointCloud, PointCloudError> {
    let (centered, _) = center(pointcloud)?;
    let furthest = centered
        .points()
        .iter()
        .map(|p| squared_distance(p, &[0.0; 3]))
        .fold(0.0f64, f64::max)
        .sqrt();
    if furthest <= f64::EPSILON {
        return Ok(centered);
    }
    let points = centered
        .points()
        .iter()
        .map(|p| [p[0] / furthest, p[1] / furthest, p[2] / furthest])
        .collect();
    Ok(PointCloud::new(
        points,
        pointcloud.colors().map(|c| c.to_vec()),
        pointcloud.normals().map(|n| n.to_vec()),
    ))
}
