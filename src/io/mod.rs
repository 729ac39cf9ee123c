// src/io/mod.rs
pub mod mmap;
pub mod reader;
pub mod writer;

pub use mmap::MmapGrid;
pub use reader::GridReader;
pub use writer::{synthetic_values, write_grid};

use crate::error::Result;

/// Bytes per grid cell: one little-endian signed 32-bit integer.
pub const CELL_BYTES: u64 = 4;

/// Raw bit pattern marking a cell as nodata.
pub const NODATA_RAW: i32 = i32::MIN;

/// Value substituted for nodata cells on decode.
pub const NODATA_OUT: i32 = 99999;

/// Decode one cell from its on-disk little-endian bytes.
///
/// The nodata sentinel (0x80000000, i.e. `i32::MIN`) decodes to
/// [`NODATA_OUT`]; every other bit pattern decodes unchanged.
#[inline]
pub fn decode_cell(bytes: [u8; 4]) -> i32 {
    let value = i32::from_le_bytes(bytes);
    if value == NODATA_RAW {
        NODATA_OUT
    } else {
        value
    }
}

/// Encode one cell to its on-disk little-endian bytes.
///
/// Encoding is raw: `i32::MIN` round-trips to the sentinel bit pattern,
/// not to [`NODATA_OUT`].
#[inline]
pub fn encode_cell(value: i32) -> [u8; 4] {
    value.to_le_bytes()
}

/// Ordered point reads from a grid file.
///
/// Implementations return one decoded value per requested index, in input
/// order, and fail on the first index that cannot be read in full.
pub trait GridRead {
    /// Read and decode a single cell.
    fn read_value(&mut self, index: u64) -> Result<i32>;

    /// Number of whole cells in the file.
    fn cell_count(&self) -> u64;

    /// Read a batch of cells. Duplicates and arbitrary ordering are
    /// allowed; the output order matches `indices`.
    fn read_values(&mut self, indices: &[u64]) -> Result<Vec<i32>> {
        let mut values = Vec::with_capacity(indices.len());
        for &index in indices {
            values.push(self.read_value(index)?);
        }
        Ok(values)
    }
}
