// src/processing/patterns/random.rs
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::processing::patterns::IndexPattern;

/// Seeded uniform-random index pattern over `0..max_index`.
///
/// The worst case for read-ahead: every lookup may fault a cold page.
/// Deterministic for a given seed so runs stay comparable.
pub struct Random {
    seed: u64,
    max_index: u64,
    name: String,
}

impl Random {
    pub fn new(seed: u64, max_index: u64, name: Option<String>) -> Self {
        Self {
            seed,
            max_index: max_index.max(1),
            name: name.unwrap_or_else(|| "random".to_string()),
        }
    }
}

impl IndexPattern for Random {
    fn generate(&self, count: usize) -> Vec<u64> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..count)
            .map(|_| rng.random_range(0..self.max_index))
            .collect()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
