// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by grid readers.
///
/// None of these are recovered locally: a batch read aborts on the first
/// error instead of continuing with undefined data. The nodata substitution
/// is a decoded-value rule and never stands in for one of these.
#[derive(Error, Debug)]
pub enum GridError {
    #[error("grid file not found: {}", path.display())]
    FileNotFound {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cell {index} is past the end of {} ({len} bytes)", path.display())]
    SeekOutOfRange { path: PathBuf, index: u64, len: u64 },

    #[error("truncated read of cell {index} in {}: file holds {len} bytes", path.display())]
    TruncatedRead { path: PathBuf, index: u64, len: u64 },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, GridError>;
