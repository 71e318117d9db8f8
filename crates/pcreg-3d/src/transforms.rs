use serde::{Deserialize, Serialize};

use crate::linalg;

/// Error types for the transforms module.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// The matrix is not a proper rotation.
    #[error("Matrix is not a rotation: |R R^T - I| = {orthogonality_error}, det = {determinant}")]
    NotARotation {
        /// Largest absolute deviation of `R R^T` from the identity.
        orthogonality_error: f64,
        /// Determinant of the matrix.
        determinant: f64,
    },
}

/// Elementary rotation about the x axis.
pub fn rotation_x(angle: f64) -> [[f64; 3]; 3] {
    let (s, c) = angle.sin_cos();
    [[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]]
}

/// Elementary rotation about the y axis.
pub fn rotation_y(angle: f64) -> [[f64; 3]; 3] {
    let (s, c) = angle.sin_cos();
    [[c, 0.0, s], [0.0, 1.0, 0.0], [-s, 0.0, c]]
}

/// Elementary rotation about the z axis.
pub fn rotation_z(angle: f64) -> [[f64; 3]; 3] {
    let (s, c) = angle.sin_cos();
    [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]]
}

/// Compose Euler angles into the rotation `R = Rx(x) * Ry(y) * Rz(z)`.
///
/// The result acts on column vectors. It equals the extrinsic `zyx` sequence
/// (rotate about fixed z, then y, then x), which is why the angles are
/// usually reported as `[z, y, x]`.
pub fn euler_xyz_to_rotation_matrix(x: f64, y: f64, z: f64) -> [[f64; 3]; 3] {
    linalg::matmul33(
        &linalg::matmul33(&rotation_x(x), &rotation_y(y)),
        &rotation_z(z),
    )
}

/// Recover the `[z, y, x]` angles of a matrix built by [`euler_xyz_to_rotation_matrix`].
///
/// The `y` angle is returned in `[-pi/2, pi/2]`. At gimbal lock (`|y| = pi/2`)
/// the `z` angle is set to zero and `x` absorbs the remaining rotation.
pub fn rotation_matrix_to_euler_zyx(r: &[[f64; 3]; 3]) -> [f64; 3] {
    // R[0][2] = sin(y), R[0][0] = cos(y)cos(z), R[0][1] = -cos(y)sin(z),
    // R[1][2] = -sin(x)cos(y), R[2][2] = cos(x)cos(y)
    let sy = r[0][2].clamp(-1.0, 1.0);
    let y = sy.asin();
    if sy.abs() < 1.0 - 1e-12 {
        let x = (-r[1][2]).atan2(r[2][2]);
        let z = (-r[0][1]).atan2(r[0][0]);
        [z, y, x]
    } else {
        // cos(y) = 0: only x +/- z is observable
        let x = if sy > 0.0 {
            r[1][0].atan2(r[1][1])
        } else {
            (-r[1][0]).atan2(r[1][1])
        };
        [0.0, y, x]
    }
}

/// A rigid transformation `p' = R p + t`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    /// Rotation matrix in row-major order.
    pub rotation: [[f64; 3]; 3],
    /// Translation vector.
    pub translation: [f64; 3],
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl RigidTransform {
    /// The identity transformation.
    pub fn identity() -> Self {
        Self {
            rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            translation: [0.0; 3],
        }
    }

    /// Create a transform checking that `rotation` is orthonormal with det = +1.
    pub fn try_new(rotation: [[f64; 3]; 3], translation: [f64; 3]) -> Result<Self, TransformError> {
        let rrt = linalg::matmul33(&rotation, &linalg::transpose33(&rotation));
        let mut orthogonality_error = 0.0f64;
        for (i, row) in rrt.iter().enumerate() {
            for (j, val) in row.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                orthogonality_error = orthogonality_error.max((val - expected).abs());
            }
        }
        let determinant = linalg::det33(&rotation);
        if orthogonality_error > 1e-6 || (determinant - 1.0).abs() > 1e-6 {
            return Err(TransformError::NotARotation {
                orthogonality_error,
                determinant,
            });
        }
        Ok(Self {
            rotation,
            translation,
        })
    }

    /// Build the transform from Euler angles composed as `Rx * Ry * Rz` and a translation.
    pub fn from_euler_xyz(angles: [f64; 3], translation: [f64; 3]) -> Self {
        Self {
            rotation: euler_xyz_to_rotation_matrix(angles[0], angles[1], angles[2]),
            translation,
        }
    }

    /// The algebraic inverse, `R' = R^T` and `t' = -R^T t`.
    pub fn inverse(&self) -> Self {
        let rotation = linalg::transpose33(&self.rotation);
        let t = linalg::mat33_mul_vec3(&rotation, &self.translation);
        Self {
            rotation,
            translation: [-t[0], -t[1], -t[2]],
        }
    }

    /// Compose two transforms: `self.compose(other)` applies `other` first, then `self`.
    pub fn compose(&self, other: &RigidTransform) -> Self {
        let rotation = linalg::matmul33(&self.rotation, &other.rotation);
        let t = linalg::mat33_mul_vec3(&self.rotation, &other.translation);
        Self {
            rotation,
            translation: [
                t[0] + self.translation[0],
                t[1] + self.translation[1],
                t[2] + self.translation[2],
            ],
        }
    }

    /// Apply the transform to a single point.
    pub fn apply(&self, point: &[f64; 3]) -> [f64; 3] {
        let p = linalg::mat33_mul_vec3(&self.rotation, point);
        [
            p[0] + self.translation[0],
            p[1] + self.translation[1],
            p[2] + self.translation[2],
        ]
    }

    /// Apply the transform to a set of points.
    pub fn transform_points(&self, points: &[[f64; 3]]) -> Vec<[f64; 3]> {
        let mut dst = vec![[0.0; 3]; points.len()];
        linalg::transform_points(points, &self.rotation, &self.translation, &mut dst);
        dst
    }

    /// The 4x4 homogeneous matrix `[R t; 0 1]`.
    pub fn to_homogeneous(&self) -> [[f64; 4]; 4] {
        let r = &self.rotation;
        let t = &self.translation;
        [
            [r[0][0], r[0][1], r[0][2], t[0]],
            [r[1][0], r[1][1], r[1][2], t[1]],
            [r[2][0], r[2][1], r[2][2], t[2]],
            [0.0, 0.0, 0.0, 1.0],
        ]
    }
}
