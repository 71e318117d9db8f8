use kiddo::immutable::float::kdtree::ImmutableKdTree;
use pcreg_3d::{linalg, ops::centroid, transforms::RigidTransform};

use crate::IcpError;

/// Minimum number of correspondences for a rigid fit.
pub(crate) const MIN_CORRESPONDENCES: usize = 3;

/// Least-squares rigid transform mapping `points_in_src` onto `points_in_dst`.
///
/// Solves the orthogonal Procrustes problem through the SVD of the cross
/// covariance; a reflection is turned into the closest proper rotation.
///
/// # Arguments
///
/// * `points_in_src` - Points in the source frame.
/// * `points_in_dst` - Corresponding points in the destination frame.
///
/// # Returns
///
/// The transform `dst_T_src`.
pub fn fit_transformation(
    points_in_src: &[[f64; 3]],
    points_in_dst: &[[f64; 3]],
) -> Result<RigidTransform, IcpError> {
    let found = points_in_src.len().min(points_in_dst.len());
    if points_in_src.len() != points_in_dst.len() || found < MIN_CORRESPONDENCES {
        return Err(IcpError::NotEnoughCorrespondences {
            found,
            required: MIN_CORRESPONDENCES,
        });
    }

    let src_centroid = centroid(points_in_src).map_err(|_| IcpError::EmptyPointCloud)?;
    let dst_centroid = centroid(points_in_dst).map_err(|_| IcpError::EmptyPointCloud)?;

    // H = sum (src - src_mean) * (dst - dst_mean)^T
    let mut h = [[0.0; 3]; 3];
    for (p_src, p_dst) in points_in_src.iter().zip(points_in_dst.iter()) {
        let s = [
            p_src[0] - src_centroid[0],
            p_src[1] - src_centroid[1],
            p_src[2] - src_centroid[2],
        ];
        let d = [
            p_dst[0] - dst_centroid[0],
            p_dst[1] - dst_centroid[1],
            p_dst[2] - dst_centroid[2],
        ];
        for i in 0..3 {
            for j in 0..3 {
                h[i][j] += s[i] * d[j];
            }
        }
    }

    // R = V * U^T
    let (u, _, mut v) = linalg::svd33(&h);
    let ut = linalg::transpose33(&u);
    let mut rotation = linalg::matmul33(&v, &ut);

    if linalg::det33(&rotation) < 0.0 {
        for row in v.iter_mut() {
            row[2] = -row[2];
        }
        rotation = linalg::matmul33(&v, &ut);
    }

    let r_src = linalg::mat33_mul_vec3(&rotation, &src_centroid);
    let translation = [
        dst_centroid[0] - r_src[0],
        dst_centroid[1] - r_src[1],
        dst_centroid[2] - r_src[2],
    ];

    Ok(RigidTransform {
        rotation,
        translation,
    })
}

/// Matched point pairs and their squared distances.
pub(crate) struct Correspondences {
    pub points_in_src: Vec<[f64; 3]>,
    pub points_in_dst: Vec<[f64; 3]>,
    pub sq_distances: Vec<f64>,
}

/// Pair every source point with its nearest target point, dropping pairs
/// farther apart than `max_distance`.
pub(crate) fn find_correspondences(
    source: &[[f64; 3]],
    target: &[[f64; 3]],
    kdtree: &ImmutableKdTree<f64, u32, 3, 32>,
    max_distance: Option<f64>,
) -> Correspondences {
    let max_sq = max_distance.map_or(f64::INFINITY, |d| d * d);

    let mut matches = Correspondences {
        points_in_src: Vec::with_capacity(source.len()),
        points_in_dst: Vec::with_capacity(source.len()),
        sq_distances: Vec::with_capacity(source.len()),
    };

    for p in source {
        let nn = kdtree.nearest_one::<kiddo::SquaredEuclidean>(p);
        if nn.distance <= max_sq {
            matches.points_in_src.push(*p);
            matches.points_in_dst.push(target[nn.item as usize]);
            matches.sq_distances.push(nn.distance);
        }
    }

    matches
}
