// src/processing/parallel.rs
use std::{
    panic,
    path::PathBuf,
    sync::Arc,
    thread::{self, JoinHandle},
};

use flume::{Receiver, Sender};
use parking_lot::Mutex;
use rayon::iter::{IntoParallelIterator, IntoParallelRefIterator as _, ParallelIterator as _};

use crate::error::Result;
use crate::io::{GridRead, GridReader};

type ScanHandler = Box<dyn Fn(usize, Result<Vec<i32>>) + Send + Sync>;

struct ScanRequest {
    grid_idx: usize,
    indices: Arc<Vec<u64>>,
    handler: Arc<ScanHandler>,
}

/// Worker pool reading per-file index batches across many grid files.
///
/// Each worker thread owns a private set of open readers, one per grid,
/// so a file's batch is read sequentially on a single handle while
/// distinct files proceed in parallel. Results are delivered through the
/// handler passed to [`ParallelScanner::run`], in completion order.
pub struct ParallelScanner {
    grids: usize,
    workers: Vec<JoinHandle<()>>,
    req_tx: Sender<ScanRequest>,
}

impl ParallelScanner {
    pub fn new(paths: &[PathBuf], threads: Option<usize>) -> Result<Self> {
        let threads = threads.unwrap_or_else(|| num_cpus::get().max(2));

        // Per-thread handle sets, opened up front so a missing file fails
        // the whole scan before any timing starts.
        let readers: Vec<Box<[Arc<Mutex<GridReader>>]>> = (0..threads)
            .into_par_iter()
            .map(|_| -> Result<Box<[Arc<Mutex<GridReader>>]>> {
                Ok(paths
                    .par_iter()
                    .map(|p| -> Result<Arc<Mutex<GridReader>>> {
                        Ok(Arc::new(Mutex::new(GridReader::open(p)?)))
                    })
                    .collect::<Result<Vec<_>>>()?
                    .into_boxed_slice())
            })
            .collect::<Result<Vec<_>>>()?;

        let (req_tx, req_rx) = flume::unbounded();

        let mut workers = Vec::new();
        for thread_readers in readers {
            let req_rx: Receiver<ScanRequest> = req_rx.clone();

            workers.push(thread::spawn(move || {
                for request in req_rx {
                    let values = {
                        let mut reader = thread_readers[request.grid_idx].lock();
                        reader.read_values(&request.indices)
                    };
                    (request.handler)(request.grid_idx, values);
                }
            }));
        }

        Ok(Self {
            grids: paths.len(),
            workers,
            req_tx,
        })
    }

    pub fn grids(&self) -> usize {
        self.grids
    }

    /// Queue one batch read per grid file. The handler runs on worker
    /// threads as each file completes.
    pub fn run(&self, indices: Arc<Vec<u64>>, handler: ScanHandler) {
        let handler = Arc::new(handler);

        for grid_idx in 0..self.grids {
            let request = ScanRequest {
                grid_idx,
                indices: Arc::clone(&indices),
                handler: Arc::clone(&handler),
            };
            self.req_tx.send(request).unwrap();
        }
    }

    pub fn join(self) {
        drop(self.req_tx);

        let mut errors = Vec::new();
        for worker in self.workers {
            if let Err(e) = worker.join() {
                errors.push(e);
            }
        }

        if !errors.is_empty() {
            panic::resume_unwind(Box::new(errors));
        }
    }
}
