// src/utils/cache.rs
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;
use crate::io::GridReader;

/// Thread-safe cache of open grid readers.
///
/// Keeps one shared handle per path so repeated batches skip the
/// open/close cost. Dropping the cache (or calling [`GridCache::clear`])
/// releases every handle.
pub struct GridCache {
    readers: Mutex<HashMap<PathBuf, Arc<Mutex<GridReader>>>>,
}

impl GridCache {
    pub fn new() -> Self {
        Self {
            readers: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_reader<P: AsRef<Path>>(&self, path: P) -> Result<Arc<Mutex<GridReader>>> {
        let path_buf = path.as_ref().to_path_buf();

        let mut cache = self.readers.lock();

        if let Some(reader) = cache.get(&path_buf) {
            return Ok(Arc::clone(reader));
        }

        // Not in cache, open and add it
        let reader = Arc::new(Mutex::new(GridReader::open(path.as_ref())?));
        cache.insert(path_buf, Arc::clone(&reader));

        Ok(reader)
    }

    pub fn clear(&self) {
        self.readers.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.readers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.readers.lock().is_empty()
    }
}

impl Default for GridCache {
    fn default() -> Self {
        Self::new()
    }
}
