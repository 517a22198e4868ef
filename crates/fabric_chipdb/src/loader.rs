//! Reading and writing database files.

use crate::db::ChipDb;
use crate::error::ChipDbError;
use crate::format::{decode_chipdb, encode_chipdb};
use crate::records::ChipInfo;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use memmap2::Mmap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ChipDbError + '_ {
    move |source| ChipDbError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Loads and validates a database file.
///
/// Plain files are memory-mapped and decoded in place; gzip-compressed
/// files are inflated into memory first.
pub fn load_chipdb(path: &Path) -> Result<ChipDb, ChipDbError> {
    let file = File::open(path).map_err(io_error(path))?;
    // SAFETY: the mapping is read-only and dropped before this function
    // returns; the database file is not expected to change while loading.
    let mapped = unsafe { Mmap::map(&file) }.map_err(io_error(path))?;

    let (info, checksum) = if mapped.starts_with(&GZIP_MAGIC) {
        let mut raw = Vec::new();
        GzDecoder::new(&mapped[..])
            .read_to_end(&mut raw)
            .map_err(io_error(path))?;
        decode_chipdb(&raw)?
    } else {
        decode_chipdb(&mapped)?
    };
    ChipDb::new(info, checksum)
}

/// Writes a database file, optionally gzip-compressed.
pub fn write_chipdb(path: &Path, info: &ChipInfo, compress: bool) -> Result<(), ChipDbError> {
    let bytes = encode_chipdb(info)?;
    let bytes = if compress {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&bytes).map_err(io_error(path))?;
        encoder.finish().map_err(io_error(path))?
    } else {
        bytes
    };
    std::fs::write(path, bytes).map_err(io_error(path))
}
