use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::JitterConfig;

/// Add clipped gaussian noise, `clip(sigma * N(0, 1), -clip, clip)`, to every coordinate.
pub fn jitter_points<R: Rng>(points: &mut [[f64; 3]], config: &JitterConfig, rng: &mut R) {
    if config.sigma == 0.0 || config.clip == 0.0 {
        return;
    }
    for point in points.iter_mut() {
        for v in point.iter_mut() {
            let n: f64 = StandardNormal.sample(rng);
            *v += (config.sigma * n).clamp(-config.clip, config.clip);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SampleRng;

    #[test]
    fn test_jitter_is_clipped() {
        let mut rng = SampleRng::new(0);
        let original = vec![[0.5, -0.5, 1.0]; 500];
        let mut points = original.clone();
        let config = JitterConfig {
            sigma: 1.0,
            clip: 0.05,
        };
        jitter_points(&mut points, &config, &mut rng);

        let mut moved = 0;
        for (p, q) in points.iter().zip(original.iter()) {
            for i in 0..3 {
                let d = (p[i] - q[i]).abs();
                assert!(d <= 0.05 + 1e-12);
                if d > 0.0 {
                    moved += 1;
                }
            }
        }
        assert!(moved > 0);
    }

    #[test]
    fn test_zero_sigma_is_noop() {
        let mut rng = SampleRng::new(0);
        let mut points = vec![[1.0, 2.0, 3.0]; 4];
        let config = JitterConfig {
            sigma: 0.0,
            clip: 0.05,
        };
        jitter_points(&mut points, &config, &mut rng);
        assert_eq!(points, vec![[1.0, 2.0, 3.0]; 4]);
    }

    #[test]
    fn test_deterministic_seed() {
        let config = JitterConfig::default();
        let mut a = vec![[0.0; 3]; 16];
        let mut b = vec![[0.0; 3]; 16];
        jitter_points(&mut a, &config, &mut SampleRng::new(9));
        jitter_points(&mut b, &config, &mut SampleRng::new(9));
        assert_eq!(a, b);
    }
}
