/// Error types for point cloud construction.
#[derive(Debug, thiserror::Error)]
pub enum PointCloudError {
    /// The point cloud has no points.
    #[error("Point cloud is empty")]
    Empty,

    /// An attribute buffer does not match the number of points.
    #[error("Attribute {name} has {actual} entries but the cloud has {expected} points")]
    AttributeLength {
        /// Name of the attribute.
        name: &'static str,
        /// Number of points in the cloud.
        expected: usize,
        /// Number of entries in the attribute.
        actual: usize,
    },
}

/// A point cloud with points, colors, and normals.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    // The points in the point cloud.
    points: Vec<[f64; 3]>,
    // The colors of the points.
    colors: Option<Vec<[u8; 3]>>,
    // The normals of the points.
    normals: Option<Vec<[f64; 3]>>,
}

impl PointCloud {
    /// Create a new point cloud from points, colors (optional), and normals (optional).
    pub fn new(
        points: Vec<[f64; 3]>,
        colors: Option<Vec<[u8; 3]>>,
        normals: Option<Vec<[f64; 3]>>,
    ) -> Self {
        Self {
            points,
            colors,
            normals,
        }
    }

    /// Create a point cloud checking that every attribute has one entry per point.
    pub fn try_new(
        points: Vec<[f64; 3]>,
        colors: Option<Vec<[u8; 3]>>,
        normals: Option<Vec<[f64; 3]>>,
    ) -> Result<Self, PointCloudError> {
        if let Some(colors) = colors.as_ref() {
            if colors.len() != points.len() {
                return Err(PointCloudError::AttributeLength {
                    name: "colors",
                    expected: points.len(),
                    actual: colors.len(),
                });
            }
        }
        if let Some(normals) = normals.as_ref() {
            if normals.len() != points.len() {
                return Err(PointCloudError::AttributeLength {
                    name: "normals",
                    expected: points.len(),
                    actual: normals.len(),
                });
            }
        }
        Ok(Self::new(points, colors, normals))
    }

    /// Get the number of points in the point cloud.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get as reference the points in the point cloud.
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    /// Get as reference the colors of the points in the point cloud.
    pub fn colors(&self) -> Option<&[[u8; 3]]> {
        self.colors.as_deref()
    }

    /// Get as reference the normals of the points in the point cloud.
    pub fn normals(&self) -> Option<&[[f64; 3]]> {
        self.normals.as_deref()
    }

    /// Drop colors and normals, keeping the xyz coordinates.
    pub fn xyz(&self) -> PointCloud {
        PointCloud::new(self.points.clone(), None, None)
    }

    /// Select the points at `indices`, carrying the attributes along.
    ///
    /// PRECONDITION: every index is lower than `self.len()`.
    pub fn select(&self, indices: &[usize]) -> PointCloud {
        let pick = |idx: &usize| self.points[*idx];
        PointCloud::new(
            indices.iter().map(pick).collect(),
            self.colors
                .as_ref()
                .map(|c| indices.iter().map(|i| c[*i]).collect()),
            self.normals
                .as_ref()
                .map(|n| indices.iter().map(|i| n[*i]).collect()),
        )
    }

    /// Keep the first `n` points (or all of them if the cloud is smaller).
    pub fn truncate(&self, n: usize) -> PointCloud {
        let n = n.min(self.len());
        let indices = (0..n).collect::<Vec<_>>();
        self.select(&indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointcloud() {
        let pointcloud = PointCloud::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            Some(vec![[255, 0, 0], [0, 255, 0]]),
            Some(vec![[0.0, 1.0, 0.0], [1.0, 0.0, 0.0]]),
        );

        assert_eq!(pointcloud.len(), 2);
        assert_eq!(pointcloud.points().len(), 2);

        if let Some(colors) = pointcloud.colors() {
            assert_eq!(colors.len(), 2);
        }
        if let Some(normals) = pointcloud.normals() {
            assert_eq!(normals.len(), 2);
        }

        if let Some(p1) = pointcloud.points().last() {
            assert_eq!(p1, &[1.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn test_try_new_attribute_length() {
        let res = PointCloud::try_new(vec![[0.0; 3]; 3], Some(vec![[0, 0, 0]; 2]), None);
        assert!(matches!(
            res,
            Err(PointCloudError::AttributeLength {
                name: "colors",
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_select_and_truncate() {
        let pc = PointCloud::new(
            vec![[0.0, -1.0, 2.0], [3.0, 4.0, -5.0], [1.0, 1.0, 1.0]],
            Some(vec![[1, 1, 1], [2, 2, 2], [3, 3, 3]]),
            None,
        );
        let sel = pc.select(&[2, 0]);
        assert_eq!(sel.points(), &[[1.0, 1.0, 1.0], [0.0, -1.0, 2.0]]);
        assert_eq!(sel.colors(), Some(&[[3, 3, 3], [1, 1, 1]][..]));

        assert_eq!(pc.truncate(10).len(), 3);
        assert_eq!(pc.truncate(1).points(), &[[0.0, -1.0, 2.0]]);
    }
}
