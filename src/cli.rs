// src/cli.rs
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::bench::ReadMode;

#[derive(Parser)]
#[command(name = "sbg-bench")]
#[command(about = "Point-read benchmark for flat binary grid rasters")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Emit reports as JSON instead of summary lines
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PatternKind {
    /// start, start+step, start+2*step, ...
    Strided,
    /// Contiguous run of cells
    Sequential,
    /// Seeded uniform-random indices
    Random,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Time repeated point reads across every grid in a directory
    Bench {
        /// Directory of grid files
        dir: PathBuf,

        /// Full directory sweeps
        #[arg(short, long, default_value = "10")]
        outer: usize,

        /// Cells read per file per sweep
        #[arg(short, long, default_value = "10000")]
        inner: usize,

        /// Index pattern
        #[arg(short, long, value_enum, default_value = "strided")]
        pattern: PatternKind,

        /// First cell index (strided/sequential)
        #[arg(long, default_value = "10000")]
        start: u64,

        /// Index stride (strided)
        #[arg(long, default_value = "3")]
        step: u64,

        /// RNG seed (random)
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Upper index bound (random); defaults to the smallest grid's cell count
        #[arg(long)]
        max_index: Option<u64>,

        /// Access mode
        #[arg(short, long, value_enum, default_value = "seek")]
        mode: ReadMode,

        /// Worker threads fanning files out (seek mode only)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Grid file extension to match
        #[arg(short, long, default_value = "sbg")]
        extension: String,
    },

    /// Decode single cells from one grid file
    Read {
        /// Grid file
        file: PathBuf,

        /// Cell indices to read
        #[arg(required = true)]
        indices: Vec<u64>,

        /// Use the memory-mapped reader
        #[arg(long)]
        mmap: bool,
    },

    /// Write a synthetic grid file for benchmarking
    Generate {
        /// Output grid file
        output: PathBuf,

        /// Number of cells (default matches a 10-arcmin global raster)
        #[arg(short, long, default_value = "2332800")]
        cells: usize,

        /// RNG seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Fraction of cells written as the nodata sentinel
        #[arg(long, default_value = "0.05")]
        nodata_ratio: f32,
    },

    /// Run several benchmarks from a JSON config
    Batch {
        /// Batch configuration file
        config: PathBuf,
    },
}
