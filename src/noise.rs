//! Uniform noise source shared by the motion and sensor models.
//!
//! A seed of 0 draws from OS entropy; any other seed gives reproducible runs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seedable generator of symmetric uniform noise.
#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    rng: StdRng,
}

impl NoiseGenerator {
    /// Create a new generator. A seed of 0 means non-deterministic.
    pub fn new(seed: u64) -> Self {
        let rng = if seed == 0 {
            StdRng::from_os_rng()
        } else {
            StdRng::seed_from_u64(seed)
        };
        Self { rng }
    }

    /// Uniform sample from `[-limit, limit]`. A zero limit always yields 0.
    #[inline]
    pub fn symmetric(&mut self, limit: f64) -> f64 {
        if limit == 0.0 {
            return 0.0;
        }
        self.rng.random_range(-limit..=limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_seed() {
        let mut a = NoiseGenerator::new(7);
        let mut b = NoiseGenerator::new(7);
        for _ in 0..100 {
            assert_eq!(a.symmetric(0.5), b.symmetric(0.5));
        }
    }

    #[test]
    fn test_zero_limit() {
        let mut noise = NoiseGenerator::new(7);
        for _ in 0..10 {
            assert_eq!(noise.symmetric(0.0), 0.0);
        }
    }

    #[test]
    fn test_samples_stay_in_range() {
        let mut noise = NoiseGenerator::new(99);
        let mut saw_negative = false;
        let mut saw_positive = false;
        for _ in 0..1000 {
            let x = noise.symmetric(0.05);
            assert!((-0.05..=0.05).contains(&x));
            saw_negative |= x < 0.0;
            saw_positive |= x > 0.0;
        }
        assert!(saw_negative && saw_positive);
    }
}
