// src/bench.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{ensure, Context, Result};
use clap::ValueEnum;
use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};

use crate::io::{GridRead, GridReader, MmapGrid};
use crate::processing::patterns::IndexPattern;
use crate::processing::ParallelScanner;
use crate::utils::GridCache;

/// How grid files are accessed during the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadMode {
    /// Open per batch, explicit seek + read per cell
    Seek,
    /// Reuse one open handle per file across all iterations
    Cached,
    /// Memory-map per batch, read cells from the mapping
    Mmap,
}

impl ReadMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadMode::Seek => "seek",
            ReadMode::Cached => "cached",
            ReadMode::Mmap => "mmap",
        }
    }
}

#[derive(Clone, Debug)]
pub struct BenchOptions {
    /// Repetitions of the full directory sweep
    pub outer: usize,
    /// Cells read per file per repetition
    pub inner: usize,
    pub mode: ReadMode,
    /// Fan batches out across files on a worker pool when set
    pub threads: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct BenchReport {
    pub pattern: String,
    pub mode: String,
    pub files: usize,
    pub outer: usize,
    pub inner: usize,
    pub threads: Option<usize>,
    pub total_reads: u64,
    pub elapsed_ms: f64,
    pub ns_per_read: f64,
    pub reads_per_sec: f64,
    /// First decoded cell per file from the final sweep, as a
    /// correctness echo alongside the timing.
    pub first_values: Vec<i32>,
}

impl BenchReport {
    pub fn print_summary(&self) {
        println!(
            "{} {}x{} over {} grids took {:.1} ms ({:.0} ns/read, {:.0} reads/s)",
            self.pattern,
            self.outer,
            self.inner,
            self.files,
            self.elapsed_ms,
            self.ns_per_read,
            self.reads_per_sec,
        );

        let preview = self.first_values.iter().take(8).join(", ");
        match self.first_values.iter().minmax() {
            MinMaxResult::NoElements => {}
            MinMaxResult::OneElement(only) => {
                println!("  first cells: [{only}]");
            }
            MinMaxResult::MinMax(min, max) => {
                let ellipsis = if self.first_values.len() > 8 { ", ..." } else { "" };
                println!("  first cells: [{preview}{ellipsis}] (min {min}, max {max})");
            }
        }
    }
}

/// List the grid files of a directory, sorted for run-to-run stability.
///
/// The directory is always an explicit parameter; nothing here assumes a
/// fixed data location.
pub fn list_grid_files(dir: &Path, extension: Option<&str>) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to list grid directory {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if let Some(ext) = extension {
            if path.extension().and_then(|e| e.to_str()) != Some(ext) {
                continue;
            }
        }
        paths.push(path);
    }
    paths.sort();
    Ok(paths)
}

/// Time `outer` sweeps of `inner` point reads over every grid in `paths`.
///
/// The index list is generated once and reused for every sweep, so all
/// iterations hit identical offsets. Any read failure aborts the run.
pub fn run_bench(
    paths: &[PathBuf],
    pattern: &dyn IndexPattern,
    opts: &BenchOptions,
) -> Result<BenchReport> {
    ensure!(!paths.is_empty(), "no grid files to benchmark");
    ensure!(opts.outer > 0, "outer count must be at least 1");
    ensure!(opts.inner > 0, "inner count must be at least 1");

    let indices = pattern.generate(opts.inner);

    let start = Instant::now();
    let first_values = match (opts.threads, opts.mode) {
        (Some(threads), ReadMode::Seek) => run_parallel(paths, &indices, opts.outer, threads)?,
        (Some(_), mode) => {
            anyhow::bail!("--threads only applies to seek mode, not {}", mode.as_str())
        }
        (None, ReadMode::Seek) => run_seek(paths, &indices, opts.outer)?,
        (None, ReadMode::Cached) => run_cached(paths, &indices, opts.outer)?,
        (None, ReadMode::Mmap) => run_mmap(paths, &indices, opts.outer)?,
    };
    let elapsed = start.elapsed();

    let total_reads = (opts.outer * opts.inner * paths.len()) as u64;
    let elapsed_ns = elapsed.as_nanos() as f64;
    Ok(BenchReport {
        pattern: pattern.name().to_string(),
        mode: opts.mode.as_str().to_string(),
        files: paths.len(),
        outer: opts.outer,
        inner: opts.inner,
        threads: opts.threads,
        total_reads,
        elapsed_ms: elapsed_ns / 1e6,
        ns_per_read: elapsed_ns / total_reads as f64,
        reads_per_sec: total_reads as f64 / (elapsed_ns / 1e9),
        first_values,
    })
}

fn run_seek(paths: &[PathBuf], indices: &[u64], outer: usize) -> Result<Vec<i32>> {
    let mut first_values = vec![0i32; paths.len()];
    for _ in 0..outer {
        for (fi, path) in paths.iter().enumerate() {
            let mut reader = GridReader::open(path)?;
            let values = reader.read_values(indices)?;
            first_values[fi] = values[0];
        }
    }
    Ok(first_values)
}

fn run_cached(paths: &[PathBuf], indices: &[u64], outer: usize) -> Result<Vec<i32>> {
    let cache = GridCache::new();
    let mut first_values = vec![0i32; paths.len()];
    for _ in 0..outer {
        for (fi, path) in paths.iter().enumerate() {
            let reader = cache.get_reader(path)?;
            let values = reader.lock().read_values(indices)?;
            first_values[fi] = values[0];
        }
    }
    Ok(first_values)
}

fn run_mmap(paths: &[PathBuf], indices: &[u64], outer: usize) -> Result<Vec<i32>> {
    let mut first_values = vec![0i32; paths.len()];
    for _ in 0..outer {
        for (fi, path) in paths.iter().enumerate() {
            let mut grid = MmapGrid::open(path)?;
            let values = grid.read_values(indices)?;
            first_values[fi] = values[0];
        }
    }
    Ok(first_values)
}

fn run_parallel(
    paths: &[PathBuf],
    indices: &[u64],
    outer: usize,
    threads: usize,
) -> Result<Vec<i32>> {
    let scanner = ParallelScanner::new(paths, Some(threads))?;
    let indices = Arc::new(indices.to_vec());
    let mut first_values = vec![0i32; paths.len()];

    for _ in 0..outer {
        let (tx, rx) = flume::unbounded();
        scanner.run(
            Arc::clone(&indices),
            Box::new(move |grid_idx, values| {
                tx.send((grid_idx, values)).unwrap();
            }),
        );

        for _ in 0..paths.len() {
            let (grid_idx, values) = rx
                .recv()
                .context("scan worker exited before delivering results")?;
            first_values[grid_idx] = values?[0];
        }
    }

    scanner.join();
    Ok(first_values)
}
