// src/batch.rs
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::bench::{list_grid_files, run_bench, BenchOptions, ReadMode};
use crate::processing::patterns::{IndexPattern, Random, Sequential, Strided};

#[derive(Deserialize, Serialize, Debug)]
pub struct BatchConfig {
    #[serde(default)]
    pub global: GlobalParams,
    pub runs: Vec<RunSpec>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct GlobalParams {
    #[serde(default = "default_outer")]
    pub outer: usize,
    #[serde(default = "default_inner")]
    pub inner: usize,
    #[serde(default = "default_mode")]
    pub mode: ReadMode,
    #[serde(default)]
    pub threads: Option<usize>,
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self {
            outer: default_outer(),
            inner: default_inner(),
            mode: default_mode(),
            threads: None,
            extension: default_extension(),
        }
    }
}

fn default_outer() -> usize {
    10
}

fn default_inner() -> usize {
    10000
}

fn default_mode() -> ReadMode {
    ReadMode::Seek
}

fn default_extension() -> String {
    "sbg".to_string()
}

#[derive(Deserialize, Serialize, Debug)]
pub struct RunSpec {
    /// Directory of grid files for this run
    pub dir: String,
    pub pattern: Option<PatternParams>,
    pub outer: Option<usize>,
    pub inner: Option<usize>,
    pub mode: Option<ReadMode>,
    pub threads: Option<usize>,
    pub extension: Option<String>,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(untagged)]
pub enum PatternParams {
    StridedParams { start: u64, step: u64 },
    SequentialParams { start: u64 },
    RandomParams { seed: u64, max_index: u64 },
}

pub fn build_pattern(params: Option<&PatternParams>) -> Box<dyn IndexPattern> {
    match params {
        // The historical default: sparse sampling from cell 10000, step 3.
        None => Box::new(Strided::new(10000, 3, None)),
        Some(PatternParams::StridedParams { start, step }) => {
            Box::new(Strided::new(*start, *step, None))
        }
        Some(PatternParams::SequentialParams { start }) => Box::new(Sequential::new(*start, None)),
        Some(PatternParams::RandomParams { seed, max_index }) => {
            Box::new(Random::new(*seed, *max_index, None))
        }
    }
}

pub fn process_batch(config_path: &PathBuf) -> Result<()> {
    // Read and parse configuration file
    let config_content = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read batch config {}", config_path.display()))?;
    let config: BatchConfig = serde_json::from_str(&config_content)
        .with_context(|| format!("invalid batch config {}", config_path.display()))?;

    println!("Starting batch run with {} benchmarks...", config.runs.len());

    for (i, run) in config.runs.iter().enumerate() {
        // Get parameters, with run-specific overrides
        let opts = BenchOptions {
            outer: run.outer.unwrap_or(config.global.outer),
            inner: run.inner.unwrap_or(config.global.inner),
            mode: run.mode.unwrap_or(config.global.mode),
            threads: run.threads.or(config.global.threads),
        };
        let extension = run.extension.as_deref().unwrap_or(&config.global.extension);
        let pattern = build_pattern(run.pattern.as_ref());

        println!(
            "[{}/{}] {} in {} ({} mode)",
            i + 1,
            config.runs.len(),
            pattern.name(),
            run.dir,
            opts.mode.as_str()
        );

        let paths = list_grid_files(Path::new(&run.dir), Some(extension))?;
        let report = run_bench(&paths, pattern.as_ref(), &opts)?;
        report.print_summary();
    }

    println!("Batch run complete!");
    Ok(())
}
