use rand::{rngs::StdRng, RngCore, SeedableRng};

/// Mix a 64-bit value with the splitmix64 finalizer.
#[inline]
fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// An explicitly passed random stream for augmentation.
///
/// Every sample should own its stream: [`SampleRng::for_index`] derives one
/// from `(seed, epoch, index)` so the draws do not depend on which worker
/// fetches the sample or in which order.
#[derive(Debug, Clone)]
pub struct SampleRng(StdRng);

impl SampleRng {
    /// Create a stream from a fixed seed.
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// Create a non-reproducible stream seeded from the thread-local generator.
    pub fn from_entropy() -> Self {
        let mut tr = rand::rng();
        Self(StdRng::from_rng(&mut tr))
    }

    /// Derive the stream of one sample from the run seed, the epoch and the dataset index.
    pub fn for_index(seed: u64, epoch: u64, index: usize) -> Self {
        let s = splitmix64(splitmix64(splitmix64(seed) ^ epoch) ^ index as u64);
        Self::new(s)
    }

    /// Derive the stream used to order an epoch.
    pub fn for_epoch(seed: u64, epoch: u64) -> Self {
        Self::new(splitmix64(seed ^ splitmix64(epoch ^ 0x5EED)))
    }
}

impl RngCore for SampleRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.0.fill_bytes(dst)
    }
}
