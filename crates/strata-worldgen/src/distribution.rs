//! Parameterized `(mean, variance)` distributions sampled from a seeded RNG.
//!
//! `variance` is the largest deviation a sample may take from the mean, so a
//! distribution with variance 0 is a constant.

use rand::Rng;
use strata_config::DistributionSettings;
use thiserror::Error;

pub use strata_config::DistributionKind;

use crate::seed::{det_cos, det_ln, det_sqrt};

/// Rejected distribution parameters.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DistributionError {
    #[error("distribution mean {0} is not finite")]
    NonFiniteMean(f32),
    #[error("distribution variance {0} must be finite and non-negative")]
    InvalidVariance(f32),
}

/// An immutable sampling rule shared read-only across chunk generations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Distribution {
    mean: f32,
    variance: f32,
    kind: DistributionKind,
}

impl Distribution {
    /// A uniform distribution over `[mean - variance, mean + variance)`.
    pub fn new(mean: f32, variance: f32) -> Result<Self, DistributionError> {
        Self::with_kind(mean, variance, DistributionKind::Uniform)
    }

    /// A normal distribution with standard deviation `variance / 3`, clamped to
    /// `mean ± variance`.
    pub fn normal(mean: f32, variance: f32) -> Result<Self, DistributionError> {
        Self::with_kind(mean, variance, DistributionKind::Normal)
    }

    pub fn with_kind(
        mean: f32,
        variance: f32,
        kind: DistributionKind,
    ) -> Result<Self, DistributionError> {
        if !mean.is_finite() {
            return Err(DistributionError::NonFiniteMean(mean));
        }
        if !variance.is_finite() || variance < 0.0 {
            return Err(DistributionError::InvalidVariance(variance));
        }
        Ok(Self {
            mean,
            variance,
            kind,
        })
    }

    /// A distribution that always yields `value`.
    pub const fn constant(value: f32) -> Self {
        Self::new_unchecked(value, 0.0)
    }

    /// Uniform distribution from literals known to be valid.
    pub(crate) const fn new_unchecked(mean: f32, variance: f32) -> Self {
        Self {
            mean,
            variance,
            kind: DistributionKind::Uniform,
        }
    }

    pub fn mean(&self) -> f32 {
        self.mean
    }

    pub fn variance(&self) -> f32 {
        self.variance
    }

    pub fn kind(&self) -> DistributionKind {
        self.kind
    }

    /// Smallest value [`Distribution::sample`] can return.
    pub fn min(&self) -> f32 {
        self.mean - self.variance
    }

    /// Largest value [`Distribution::sample`] can return.
    pub fn max(&self) -> f32 {
        self.mean + self.variance
    }

    /// Draw one value.
    ///
    /// With variance 0 this returns exactly the mean and consumes no randomness.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.variance == 0.0 {
            return self.mean;
        }
        let offset = match self.kind {
            DistributionKind::Uniform => rng.random::<f32>() * 2.0 - 1.0,
            DistributionKind::Normal => (standard_normal(rng) / 3.0).clamp(-1.0, 1.0) as f32,
        };
        self.mean + self.variance * offset
    }

    /// Draw a non-negative count: the whole part of a sample, plus one with a
    /// probability equal to its fractional part.
    pub fn sample_count<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let value = self.sample(rng);
        if value <= 0.0 {
            return 0;
        }
        let whole = value.floor();
        let fraction = value - whole;
        let mut count = whole as u32;
        if fraction > 0.0 && rng.random::<f32>() < fraction {
            count += 1;
        }
        count
    }
}

impl TryFrom<&DistributionSettings> for Distribution {
    type Error = DistributionError;

    fn try_from(settings: &DistributionSettings) -> Result<Self, Self::Error> {
        Self::with_kind(settings.mean, settings.variance, settings.kind)
    }
}

/// Box-Muller transform over libm so every platform draws the same values.
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // 1 - [0, 1) keeps the logarithm finite.
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    det_sqrt(-2.0 * det_ln(u1)) * det_cos(std::f64::consts::TAU * u2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_zero_variance_returns_mean_for_any_seed() {
        for seed in 0..64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for mean in [-3.5_f32, 0.0, 1.0, 30.0, 1000.0] {
                let uniform = Distribution::new(mean, 0.0).unwrap();
                let normal = Distribution::normal(mean, 0.0).unwrap();
                assert_eq!(uniform.sample(&mut rng), mean);
                assert_eq!(normal.sample(&mut rng), mean);
            }
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let dist = Distribution::new(5.0, 2.0).unwrap();
        let mut a = ChaCha8Rng::seed_from_u64(42);
        let mut b = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..500 {
            assert_eq!(dist.sample(&mut a), dist.sample(&mut b));
        }
    }

    #[test]
    fn test_samples_stay_within_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for dist in [
            Distribution::new(10.0, 4.0).unwrap(),
            Distribution::normal(10.0, 4.0).unwrap(),
        ] {
            for _ in 0..10_000 {
                let v = dist.sample(&mut rng);
                assert!(
                    v >= dist.min() && v <= dist.max(),
                    "{v} outside [{}, {}]",
                    dist.min(),
                    dist.max()
                );
            }
        }
    }

    #[test]
    fn test_uniform_mean_is_centered() {
        let dist = Distribution::new(2.0, 1.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let n = 20_000;
        let total: f64 = (0..n).map(|_| dist.sample(&mut rng) as f64).sum();
        let mean = total / n as f64;
        assert!((mean - 2.0).abs() < 0.05, "sample mean {mean}");
    }

    #[test]
    fn test_negative_variance_rejected() {
        assert_eq!(
            Distribution::new(1.0, -0.1),
            Err(DistributionError::InvalidVariance(-0.1))
        );
        assert!(Distribution::new(1.0, f32::NAN).is_err());
        assert!(matches!(
            Distribution::normal(f32::INFINITY, 1.0),
            Err(DistributionError::NonFiniteMean(_))
        ));
    }

    #[test]
    fn test_sample_count_exact_for_whole_constants() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(Distribution::constant(1.0).sample_count(&mut rng), 1);
        assert_eq!(Distribution::constant(0.0).sample_count(&mut rng), 0);
        assert_eq!(Distribution::constant(-2.0).sample_count(&mut rng), 0);
        assert_eq!(Distribution::constant(4.0).sample_count(&mut rng), 4);
    }

    #[test]
    fn test_sample_count_rounds_fraction_stochastically() {
        let dist = Distribution::constant(0.25);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let n = 20_000;
        let hits: u32 = (0..n).map(|_| dist.sample_count(&mut rng)).sum();
        let rate = hits as f64 / n as f64;
        assert!((rate - 0.25).abs() < 0.02, "hit rate {rate}");
    }

    #[test]
    fn test_from_settings() {
        let settings = DistributionSettings::new(3.0, 1.0);
        let dist = Distribution::try_from(&settings).unwrap();
        assert_eq!(dist.mean(), 3.0);
        assert_eq!(dist.kind(), DistributionKind::Uniform);
        assert!(Distribution::try_from(&DistributionSettings::new(3.0, -1.0)).is_err());
    }
}
