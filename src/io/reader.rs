// src/io/reader.rs
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::{GridError, Result};
use crate::io::{decode_cell, GridRead, CELL_BYTES};

/// Seek-based point reader over a flat binary grid file.
///
/// The file is a headerless array of little-endian i32 cells; cell `i`
/// lives at byte offset `i * 4`. The handle is released when the reader
/// is dropped, on error paths included.
pub struct GridReader {
    path: PathBuf,
    file: File,
    len: u64,
}

impl GridReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => GridError::FileNotFound {
                path: path.clone(),
                source,
            },
            _ => GridError::Io {
                path: path.clone(),
                source,
            },
        })?;
        let len = file
            .metadata()
            .map_err(|source| GridError::Io {
                path: path.clone(),
                source,
            })?
            .len();

        Ok(Self { path, file, len })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File length in bytes.
    pub fn byte_len(&self) -> u64 {
        self.len
    }

    fn cell_offset(&self, index: u64) -> Result<u64> {
        let offset = index
            .checked_mul(CELL_BYTES)
            .ok_or_else(|| GridError::SeekOutOfRange {
                path: self.path.clone(),
                index,
                len: self.len,
            })?;
        if offset >= self.len {
            return Err(GridError::SeekOutOfRange {
                path: self.path.clone(),
                index,
                len: self.len,
            });
        }
        if offset + CELL_BYTES > self.len {
            // Offset lands inside the file but the cell is cut short,
            // e.g. a trailing partial cell in a misaligned file.
            return Err(GridError::TruncatedRead {
                path: self.path.clone(),
                index,
                len: self.len,
            });
        }
        Ok(offset)
    }
}

impl GridRead for GridReader {
    fn read_value(&mut self, index: u64) -> Result<i32> {
        let offset = self.cell_offset(index)?;

        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|source| GridError::Io {
                path: self.path.clone(),
                source,
            })?;

        let mut bytes = [0u8; 4];
        self.file
            .read_exact(&mut bytes)
            .map_err(|source| match source.kind() {
                ErrorKind::UnexpectedEof => GridError::TruncatedRead {
                    path: self.path.clone(),
                    index,
                    len: self.len,
                },
                _ => GridError::Io {
                    path: self.path.clone(),
                    source,
                },
            })?;

        Ok(decode_cell(bytes))
    }

    fn cell_count(&self) -> u64 {
        self.len / CELL_BYTES
    }
}
