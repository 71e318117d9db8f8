use rand::{seq::SliceRandom, Rng};

use crate::OutlierConfig;

/// Append uniform outliers to a cloud and shuffle points and mask jointly.
///
/// The outliers are drawn from `[-extent, extent]^3` and flagged with `0` in the
/// returned mask; the mask entries of the input points are carried over.
///
/// PRECONDITION: `mask.len() == points.len()`.
pub fn add_outliers<R: Rng>(
    points: Vec<[f64; 3]>,
    mask: Vec<u8>,
    config: &OutlierConfig,
    rng: &mut R,
) -> (Vec<[f64; 3]>, Vec<u8>) {
    debug_assert_eq!(points.len(), mask.len());

    let e = config.extent;
    let mut merged = points.into_iter().zip(mask).collect::<Vec<_>>();
    merged.reserve(config.count);
    for _ in 0..config.count {
        let p = [
            rng.random_range(-e..=e),
            rng.random_range(-e..=e),
            rng.random_range(-e..=e),
        ];
        merged.push((p, 0));
    }

    merged.shuffle(rng);
    merged.into_iter().unzip()
}
