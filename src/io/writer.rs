// src/io/writer.rs
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;

use crate::error::{GridError, Result};
use crate::io::{encode_cell, NODATA_RAW};

/// Write a grid file: the raw little-endian cell array, nothing else.
pub fn write_grid<P: AsRef<Path>>(path: P, values: &[i32]) -> Result<()> {
    let path = path.as_ref();
    let io_err = |source| GridError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);
    for &value in values {
        out.write_all(&encode_cell(value)).map_err(io_err)?;
    }
    out.flush().map_err(io_err)?;
    Ok(())
}

/// Deterministic synthetic cell values for benchmark fixtures.
///
/// `nodata_ratio` is the fraction of cells written as the raw nodata
/// sentinel. Generation is chunked so the output only depends on `seed`,
/// not on thread count.
pub fn synthetic_values(cells: usize, seed: u64, nodata_ratio: f32) -> Vec<i32> {
    const CHUNK: usize = 64 * 1024;

    let mut values = vec![0i32; cells];
    values
        .par_chunks_mut(CHUNK)
        .enumerate()
        .for_each(|(chunk_idx, chunk)| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(chunk_idx as u64));
            for value in chunk.iter_mut() {
                *value = if rng.random::<f32>() < nodata_ratio {
                    NODATA_RAW
                } else {
                    // Plausible raster range, e.g. bathymetry in meters.
                    rng.random_range(-11_000..9_000)
                };
            }
        });
    values
}
