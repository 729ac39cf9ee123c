// src/processing/patterns/strided.rs
use crate::processing::patterns::IndexPattern;

/// Fixed-stride index pattern: `start, start+step, start+2*step, ...`
///
/// The classic sparse-sampling pattern for point extraction from a large
/// raster, hopping over the grid at a constant interval.
pub struct Strided {
    start: u64,
    step: u64,
    name: String,
}

impl Strided {
    pub fn new(start: u64, step: u64, name: Option<String>) -> Self {
        Self {
            start,
            step,
            name: name.unwrap_or_else(|| "strided".to_string()),
        }
    }
}

impl IndexPattern for Strided {
    fn generate(&self, count: usize) -> Vec<u64> {
        (0..count as u64).map(|i| self.start + i * self.step).collect()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
