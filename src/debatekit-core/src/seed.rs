//! Sampling seeds for debater turns and judge passes.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const SEED_MIN: i64 = 1;
pub const SEED_MAX: i64 = 1_000_000_000;

/// Uniform seed draws over `SEED_MIN..=SEED_MAX`.
#[derive(Debug, Clone)]
pub struct SeedSource {
    rng: StdRng,
}

impl SeedSource {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic source, for reproducible runs and tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn draw(&mut self) -> i64 {
        self.rng.random_range(SEED_MIN..=SEED_MAX)
    }

    /// Draw `count` seeds, no two equal.
    pub fn draw_distinct(&mut self, count: usize) -> Vec<i64> {
        let mut seen = HashSet::with_capacity(count);
        let mut seeds = Vec::with_capacity(count);
        while seeds.len() < count {
            let seed = self.draw();
            if seen.insert(seed) {
                seeds.push(seed);
            }
        }
        seeds
    }
}

impl Default for SeedSource {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draws_stay_in_range() {
        let mut source = SeedSource::seeded(7);
        for _ in 0..1000 {
            let seed = source.draw();
            assert!((SEED_MIN..=SEED_MAX).contains(&seed));
        }
    }

    #[test]
    fn test_draw_distinct_has_no_duplicates() {
        let mut source = SeedSource::seeded(1);
        let seeds = source.draw_distinct(500);
        let unique: HashSet<_> = seeds.iter().collect();
        assert_eq!(unique.len(), 500);
    }

    #[test]
    fn test_seeded_source_is_reproducible() {
        let a = SeedSource::seeded(99).draw_distinct(5);
        let b = SeedSource::seeded(99).draw_distinct(5);
        assert_eq!(a, b);
    }
}
