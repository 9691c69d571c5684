//! Weighted species selection.
//!
//! [`WeightedIndex`] stores the running sum of the species concentrations and maps a
//! uniform roll onto an index with a binary search over that prefix sum.
use rand::Rng as RngCore;

use crate::error::{Error, Result};
use crate::variation::rand01;

/// Discrete distribution over `0..len` proportional to non-negative weights.
#[derive(Clone, Debug)]
pub struct WeightedIndex {
    cumulative: Vec<f64>,
}

impl WeightedIndex {
    /// Builds the sampler. Weights must be finite and non-negative with a positive total.
    pub fn new(weights: impl IntoIterator<Item = f64>) -> Result<Self> {
        let mut total = 0.0;
        let mut cumulative = Vec::new();
        for w in weights {
            if !w.is_finite() || w < 0.0 {
                return Err(Error::InvalidConfig(format!("invalid species weight {w}")));
            }
            total += w;
            cumulative.push(total);
        }
        if cumulative.is_empty() {
            return Err(Error::NoSpecies);
        }
        if total <= 0.0 {
            return Err(Error::InvalidConfig("species weights sum to zero".into()));
        }
        Ok(Self { cumulative })
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Draws one index.
    pub fn sample(&self, rng: &mut dyn RngCore) -> usize {
        let roll = rand01(rng) * self.total();
        // First bucket whose running sum exceeds the roll; zero-weight entries are skipped.
        let idx = self.cumulative.partition_point(|&c| c <= roll);
        idx.min(self.cumulative.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    struct FixedRng {
        value: u64,
    }

    impl rand::TryRng for FixedRng {
        type Error = core::convert::Infallible;

        fn try_next_u32(&mut self) -> core::result::Result<u32, Self::Error> {
            Ok((self.value >> 32) as u32)
        }

        fn try_next_u64(&mut self) -> core::result::Result<u64, Self::Error> {
            Ok(self.value)
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> core::result::Result<(), Self::Error> {
            let bytes = self.value.to_le_bytes();
            for (i, b) in dest.iter_mut().enumerate() {
                *b = bytes[i % 8];
            }
            Ok(())
        }
    }

    #[test]
    fn roll_maps_onto_prefix_sum() {
        let index = WeightedIndex::new([0.7, 0.3]).unwrap();
        assert_eq!(index.sample(&mut FixedRng { value: 0 }), 0);
        let mut high = FixedRng {
            value: (0.8 * u64::MAX as f64) as u64,
        };
        assert_eq!(index.sample(&mut high), 1);
        assert_eq!(index.sample(&mut FixedRng { value: u64::MAX }), 1);
    }

    #[test]
    fn zero_weight_species_is_never_drawn() {
        let index = WeightedIndex::new([0.0, 1.0, 0.0]).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            assert_eq!(index.sample(&mut rng), 1);
        }
    }

    #[test]
    fn rejects_invalid_weights() {
        assert!(matches!(
            WeightedIndex::new(Vec::new()),
            Err(Error::NoSpecies)
        ));
        assert!(WeightedIndex::new([0.0, 0.0]).is_err());
        assert!(WeightedIndex::new([1.0, -1.0]).is_err());
        assert!(WeightedIndex::new([1.0, f64::NAN]).is_err());
    }

    #[test]
    fn frequencies_follow_weights() {
        let index = WeightedIndex::new([1.0, 3.0]).unwrap();
        let mut rng = StdRng::seed_from_u64(0xC0FFEE);
        let n = 40_000;
        let ones = (0..n).filter(|_| index.sample(&mut rng) == 1).count();
        let share = ones as f64 / n as f64;
        assert!((share - 0.75).abs() < 0.02, "share {share}");
    }
}
