use rand::seq::SliceRandom;
use rayon::prelude::*;

use crate::{DatasetError, PointCloudSource, RegistrationDataset, Sample, SampleRng};

/// Samples of one batch stacked into contiguous channels-first arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Dataset indices of the samples.
    pub indices: Vec<usize>,
    /// Number of target points per sample.
    pub num_target_points: usize,
    /// Number of source points per sample.
    pub num_source_points: usize,
    /// Targets, `B x 3 x N`.
    pub target: Vec<f32>,
    /// Sources, `B x 3 x N`.
    pub source: Vec<f32>,
    /// Inverse rotations, `B x 3 x 3`.
    pub rotation_inv: Vec<f32>,
    /// Inverse translations, `B x 3`.
    pub translation_inv: Vec<f32>,
    /// Euler angles `[z, y, x]`, `B x 3`.
    pub euler: Vec<f32>,
    /// Masks, `B x M`.
    pub mask: Vec<u8>,
}

impl Batch {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the batch holds no sample.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Stack samples that share the same point and mask counts.
    pub fn collate(indices: Vec<usize>, samples: &[Sample]) -> Result<Self, DatasetError> {
        let (n_tgt, n_src, n_mask) = samples
            .first()
            .map(|s| (s.target.len(), s.source.len(), s.mask.len()))
            .unwrap_or_default();

        let mut batch = Batch {
            indices,
            num_target_points: n_tgt,
            num_source_points: n_src,
            target: Vec::with_capacity(samples.len() * 3 * n_tgt),
            source: Vec::with_capacity(samples.len() * 3 * n_src),
            rotation_inv: Vec::with_capacity(samples.len() * 9),
            translation_inv: Vec::with_capacity(samples.len() * 3),
            euler: Vec::with_capacity(samples.len() * 3),
            mask: Vec::with_capacity(samples.len() * n_mask),
        };

        for sample in samples {
            for (expected, actual) in [
                (n_tgt, sample.target.len()),
                (n_src, sample.source.len()),
                (n_mask, sample.mask.len()),
            ] {
                if expected != actual {
                    return Err(DatasetError::RaggedBatch { expected, actual });
                }
            }
            batch.target.extend(sample.target_channels_first());
            batch.source.extend(sample.source_channels_first());
            batch
                .rotation_inv
                .extend(sample.rotation_inv.iter().flatten());
            batch.translation_inv.extend(sample.translation_inv);
            batch.euler.extend(sample.euler);
            batch.mask.extend_from_slice(&sample.mask);
        }

        Ok(batch)
    }
}

/// Loads batches of samples in parallel.
///
/// Every sample draws from the stream `SampleRng::for_index(seed, epoch, index)`,
/// so a batch does not depend on the number of threads or their scheduling.
pub struct BatchLoader<'a, S: PointCloudSource> {
    dataset: &'a RegistrationDataset<S>,
    batch_size: usize,
    seed: u64,
    shuffle: bool,
    drop_last: bool,
}

impl<'a, S: PointCloudSource> BatchLoader<'a, S> {
    /// Create a loader with seed 0, shuffling enabled and the last short batch kept.
    pub fn new(
        dataset: &'a RegistrationDataset<S>,
        batch_size: usize,
    ) -> Result<Self, DatasetError> {
        if batch_size == 0 {
            return Err(DatasetError::InvalidBatchSize);
        }
        Ok(Self {
            dataset,
            batch_size,
            seed: 0,
            shuffle: true,
            drop_last: false,
        })
    }

    /// Set the run seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable the per-epoch permutation of the indices.
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Drop the last batch when it is shorter than the batch size.
    pub fn with_drop_last(mut self, drop_last: bool) -> Self {
        self.drop_last = drop_last;
        self
    }

    /// Number of batches per epoch.
    pub fn num_batches(&self) -> usize {
        let n = self.dataset.len();
        if self.drop_last {
            n / self.batch_size
        } else {
            n.div_ceil(self.batch_size)
        }
    }

    /// Dataset indices of every batch of an epoch.
    pub fn batches(&self, epoch: u64) -> Vec<Vec<usize>> {
        let mut indices = (0..self.dataset.len()).collect::<Vec<_>>();
        if self.shuffle {
            indices.shuffle(&mut SampleRng::for_epoch(self.seed, epoch));
        }
        indices
            .chunks(self.batch_size)
            .filter(|chunk| !self.drop_last || chunk.len() == self.batch_size)
            .map(|chunk| chunk.to_vec())
            .collect()
    }

    /// Fetch the samples at `indices` in parallel.
    ///
    /// The first failing sample aborts the batch.
    pub fn load_batch(&self, epoch: u64, indices: &[usize]) -> Result<Vec<Sample>, DatasetError> {
        load_samples(self.dataset, self.seed, epoch, indices)
    }

    /// Iterate over the collated batches of an epoch.
    pub fn epoch(&self, epoch: u64) -> impl Iterator<Item = Result<Batch, DatasetError>> + 'a {
        let dataset = self.dataset;
        let seed = self.seed;
        self.batches(epoch).into_iter().map(move |indices| {
            let samples = load_samples(dataset, seed, epoch, &indices)?;
            Batch::collate(indices, &samples)
        })
    }
}

fn load_samples<S: PointCloudSource>(
    dataset: &RegistrationDataset<S>,
    seed: u64,
    epoch: u64,
    indices: &[usize],
) -> Result<Vec<Sample>, DatasetError> {
    log::debug!("loading batch of {} samples for epoch {epoch}", indices.len());
    indices
        .par_iter()
        .map(|&index| {
            let mut rng = SampleRng::for_index(seed, epoch, index);
            dataset.get(index, &mut rng)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{source::ModelNet40, AugmentConfig, Preprocess, Split};
    use pcreg_3d::pointcloud::PointCloud;

    fn dataset(n: usize) -> Result<RegistrationDataset<ModelNet40>, DatasetError> {
        let clouds = (0..n)
            .map(|i| {
                let points = (0..32)
                    .map(|j| [i as f64, (j as f64 * 0.3).sin(), (j as f64 * 0.7).cos()])
                    .collect();
                PointCloud::new(points, None, None)
            })
            .collect::<Vec<_>>();
        let labels = vec![0; n];
        let source = ModelNet40::from_arrays(clouds, labels, Split::Train)?;
        RegistrationDataset::new(source, Preprocess::default(), AugmentConfig::default())
    }

    #[test]
    fn test_batches_cover_dataset() -> Result<(), DatasetError> {
        let dataset = dataset(10)?;
        let loader = BatchLoader::new(&dataset, 4)?.with_seed(1);
        let batches = loader.batches(0);
        assert_eq!(batches.len(), 3);
        assert_eq!(loader.num_batches(), 3);
        let mut all = batches.concat();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());

        let loader = loader.with_drop_last(true);
        assert_eq!(loader.batches(0).len(), 2);
        assert_eq!(loader.num_batches(), 2);
        Ok(())
    }

    #[test]
    fn test_unshuffled_order() -> Result<(), DatasetError> {
        let dataset = dataset(5)?;
        let loader = BatchLoader::new(&dataset, 2)?.with_shuffle(false);
        assert_eq!(loader.batches(3), vec![vec![0, 1], vec![2, 3], vec![4]]);
        Ok(())
    }

    #[test]
    fn test_load_batch_independent_of_grouping() -> Result<(), DatasetError> {
        let dataset = dataset(6)?;
        let loader = BatchLoader::new(&dataset, 6)?.with_seed(7);
        let together = loader.load_batch(2, &[0, 1, 2, 3, 4, 5])?;
        let single = loader.load_batch(2, &[4])?;
        assert_eq!(together[4], single[0]);

        let other_epoch = loader.load_batch(3, &[4])?;
        assert_ne!(other_epoch[0], single[0]);
        Ok(())
    }

    #[test]
    fn test_epoch_collates() -> Result<(), DatasetError> {
        let dataset = dataset(5)?;
        let loader = BatchLoader::new(&dataset, 2)?.with_seed(0);
        let batches = loader.epoch(0).collect::<Result<Vec<_>, _>>()?;
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 2);
        assert_eq!(batches[0].target.len(), 2 * 3 * 32);
        assert_eq!(batches[0].rotation_inv.len(), 18);
        assert_eq!(batches[2].mask, vec![1; 32]);
        Ok(())
    }

    #[test]
    fn test_zero_batch_size() -> Result<(), DatasetError> {
        let dataset = dataset(3)?;
        assert!(matches!(
            BatchLoader::new(&dataset, 0),
            Err(DatasetError::InvalidBatchSize)
        ));
        Ok(())
    }

    #[test]
    fn test_collate_ragged() {
        let sample = |n: usize| Sample {
            target: vec![[0.0; 3]; n],
            source: vec![[0.0; 3]; n],
            rotation_inv: [[0.0; 3]; 3],
            translation_inv: [0.0; 3],
            euler: [0.0; 3],
            mask: vec![1; n],
        };
        assert!(matches!(
            Batch::collate(vec![0, 1], &[sample(4), sample(5)]),
            Err(DatasetError::RaggedBatch {
                expected: 4,
                actual: 5
            })
        ));
    }
}
