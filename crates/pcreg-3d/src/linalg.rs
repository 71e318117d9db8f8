use crate::utils;

/// Transform a set of points using a rotation and translation.
///
/// # Arguments
///
/// * `src_points` - A set of points to be transformed.
/// * `dst_r_src` - A rotation matrix in row-major order.
/// * `dst_t_src` - A translation vector.
/// * `dst_points` - A pre-allocated vector to store the transformed points.
///
/// PRECONDITION: dst_points is a pre-allocated vector of the same size as source.
///
/// Example:
///
/// ```
/// use pcreg_3d::linalg::transform_points;
///
/// let src_points = vec![[2.0, 2.0, 2.0], [3.0, 4.0, 5.0]];
/// let rotation = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
/// let translation = [1.0, 0.0, 0.0];
/// let mut dst_points = vec![[0.0; 3]; src_points.len()];
/// transform_points(&src_points, &rotation, &translation, &mut dst_points);
/// assert_eq!(dst_points[0], [3.0, 2.0, 2.0]);
/// ```
pub fn transform_points(
    src_points: &[[f64; 3]],
    dst_r_src: &[[f64; 3]; 3],
    dst_t_src: &[f64; 3],
    dst_points: &mut [[f64; 3]],
) {
    assert_eq!(src_points.len(), dst_points.len());

    if src_points.is_empty() {
        return;
    }

    let dst_r_src_mat = utils::array33_to_faer_mat33(dst_r_src);

    // view the source points as a Nx3 row-major matrix
    let points_in_src =
        faer::mat::from_row_major_slice(src_points.as_flattened(), src_points.len(), 3);

    // view the destination points as a 3xN column-major matrix, one column per point
    let mut points_in_dst = faer::mat::from_column_major_slice_mut(
        dst_points.as_flattened_mut(),
        3,
        src_points.len(),
    );

    // dst = R * src^T
    faer::linalg::matmul::matmul(
        &mut points_in_dst,
        dst_r_src_mat,
        points_in_src.transpose(),
        None,
        1.0,
        faer::Parallelism::None,
    );

    for point in dst_points.iter_mut() {
        point[0] += dst_t_src[0];
        point[1] += dst_t_src[1];
        point[2] += dst_t_src[2];
    }
}

/// Multiply two 3x3 matrices, `m = a * b`.
pub fn matmul33(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut m = [[0.0; 3]; 3];
    for (i, row) in m.iter_mut().enumerate() {
        for (j, val) in row.iter_mut().enumerate() {
            *val = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
        }
    }
    m
}

/// Multiply a 3x3 matrix with a 3d column vector.
pub fn mat33_mul_vec3(m: &[[f64; 3]; 3], v: &[f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// Transpose a 3x3 matrix.
pub fn transpose33(m: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    [
        [m[0][0], m[1][0], m[2][0]],
        [m[0][1], m[1][1], m[2][1]],
        [m[0][2], m[1][2], m[2][2]],
    ]
}

/// Determinant of a 3x3 matrix.
pub fn det33(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Compute the singular value decomposition `m = U * diag(s) * V^T` of a 3x3 matrix.
///
/// Returns `(U, s, V)` as row-major arrays with singular values in decreasing order.
pub fn svd33(m: &[[f64; 3]; 3]) -> ([[f64; 3]; 3], [f64; 3], [[f64; 3]; 3]) {
    let mat = utils::array33_to_faer_mat33(m);
    let svd = mat.svd();
    let s = svd.s_diagonal();
    (
        utils::faer_mat33_to_array33(svd.u()),
        [s.read(0), s.read(1), s.read(2)],
        utils::faer_mat33_to_array33(svd.v()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_transform_points_identity() {
        let src_points = vec![[2.0, 2.0, 2.0], [3.0, 4.0, 5.0]];
        let rotation = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let translation = [0.0, 0.0, 0.0];
        let mut dst_points = vec![[0.0; 3]; src_points.len()];
        transform_points(&src_points, &rotation, &translation, &mut dst_points);

        assert_eq!(dst_points, src_points);
    }

    #[test]
    fn test_transform_points_roundtrip() {
        let src_points = vec![[2.0, 2.0, 2.0], [3.0, 4.0, 5.0]];
        let rotation = [[1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]];
        let translation = [1.0, 2.0, 3.0];

        let mut dst_points = vec![[0.0; 3]; src_points.len()];
        transform_points(&src_points, &rotation, &translation, &mut dst_points);
        assert_eq!(dst_points[0], [3.0, 0.0, 5.0]);

        // R' = R^T, t' = -R^T * t
        let rotation_inv = transpose33(&rotation);
        let t = mat33_mul_vec3(&rotation_inv, &translation);
        let translation_inv = [-t[0], -t[1], -t[2]];

        let mut dst_points_src = vec![[0.0; 3]; dst_points.len()];
        transform_points(
            &dst_points,
            &rotation_inv,
            &translation_inv,
            &mut dst_points_src,
        );

        assert_eq!(dst_points_src, src_points);
    }

    #[test]
    fn test_transform_points_empty() {
        let mut dst: Vec<[f64; 3]> = vec![];
        transform_points(&[], &[[1.0, 0.0, 0.0]; 3], &[0.0; 3], &mut dst);
        assert!(dst.is_empty());
    }

    #[test]
    fn test_matmul_det_transpose() {
        let a = [[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
        let at = transpose33(&a);
        let eye = matmul33(&a, &at);
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(eye[i][j], if i == j { 1.0 } else { 0.0 });
            }
        }
        assert_relative_eq!(det33(&a), 1.0);
        assert_eq!(mat33_mul_vec3(&a, &[1.0, 0.0, 0.0]), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_svd33_reconstructs() {
        let m = [[2.0, 0.5, 0.1], [0.3, 1.0, -0.2], [0.0, 0.4, 3.0]];
        let (u, s, v) = svd33(&m);
        assert!(s[0] >= s[1] && s[1] >= s[2]);
        let us = [
            [u[0][0] * s[0], u[0][1] * s[1], u[0][2] * s[2]],
            [u[1][0] * s[0], u[1][1] * s[1], u[1][2] * s[2]],
            [u[2][0] * s[0], u[2][1] * s[1], u[2][2] * s[2]],
        ];
        let rec = matmul33(&us, &transpose33(&v));
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(rec[i][j], m[i][j], epsilon = 1e-10);
            }
        }
    }
}
