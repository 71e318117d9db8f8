use std::num::NonZero;

use kiddo::{immutable::float::kdtree::ImmutableKdTree, SquaredEuclidean};
use rand::Rng;

use crate::AugmentError;

/// Offset of the subsampling query along every axis.
const QUERY_OFFSET: f64 = 500.0;

/// Indices of the `k` points closest to `query`, nearest first.
///
/// Equidistant neighbours are ordered by index.
pub fn knn_indices(
    points: &[[f64; 3]],
    query: &[f64; 3],
    k: usize,
) -> Result<Vec<usize>, AugmentError> {
    let out_of_range = || AugmentError::SubsampleOutOfRange {
        requested: k,
        available: points.len(),
    };
    if k > points.len() {
        return Err(out_of_range());
    }
    let max_qty = NonZero::new(k).ok_or_else(out_of_range)?;

    let kdtree: ImmutableKdTree<f64, u32, 3, 32> = ImmutableKdTree::new_from_slice(points);
    let mut neighbours = kdtree
        .nearest_n::<SquaredEuclidean>(query, max_qty)
        .into_iter()
        .map(|nn| (nn.distance, nn.item as usize))
        .collect::<Vec<_>>();
    neighbours.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    Ok(neighbours.into_iter().map(|(_, i)| i).collect())
}

/// Keep a spatially contiguous patch of `k` points.
///
/// The query lies far outside the cloud, at `u + s * (500, 500, 500)` with
/// `u ~ U[0, 1)^3` and `s = +/-1`, so its `k` nearest neighbours form a
/// half-space crop of the cloud. Returns the retained indices, nearest first,
/// and a `{0, 1}` mask over the input marking them.
pub fn knn_subsample<R: Rng>(
    points: &[[f64; 3]],
    k: usize,
    rng: &mut R,
) -> Result<(Vec<usize>, Vec<u8>), AugmentError> {
    let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    let query = [
        rng.random::<f64>() + sign * QUERY_OFFSET,
        rng.random::<f64>() + sign * QUERY_OFFSET,
        rng.random::<f64>() + sign * QUERY_OFFSET,
    ];

    let indices = knn_indices(points, &query, k)?;

    let mut mask = vec![0u8; points.len()];
    for &i in indices.iter() {
        mask[i] = 1;
    }

    Ok((indices, mask))
}
