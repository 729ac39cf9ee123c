// src/processing/patterns/sequential.rs
use crate::processing::patterns::IndexPattern;

/// Contiguous index pattern: `start, start+1, start+2, ...`
///
/// Reads a dense run of cells, the friendliest case for the page cache.
pub struct Sequential {
    start: u64,
    name: String,
}

impl Sequential {
    pub fn new(start: u64, name: Option<String>) -> Self {
        Self {
            start,
            name: name.unwrap_or_else(|| "sequential".to_string()),
        }
    }
}

impl IndexPattern for Sequential {
    fn generate(&self, count: usize) -> Vec<u64> {
        (self.start..self.start + count as u64).collect()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
