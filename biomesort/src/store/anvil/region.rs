//! Anvil region file access.
//!
//! A region file holds 32×32 chunks. The first 4 KiB sector is a table of
//! chunk locations (3-byte sector offset, 1-byte sector count), the second
//! holds timestamps. Each chunk payload starts with a 4-byte length and a
//! 1-byte compression type.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};

use flate2::read::{GzDecoder, ZlibDecoder};
use thiserror::Error;

use crate::coord::CellCoord;

pub const SECTOR_SIZE: u64 = 4096;
const HEADER_SIZE: u64 = 2 * SECTOR_SIZE;

const COMPRESSION_GZIP: u8 = 1;
const COMPRESSION_ZLIB: u8 = 2;
const COMPRESSION_NONE: u8 = 3;
/// Flag marking a chunk stored in a separate `.mcc` file
const COMPRESSION_EXTERNAL_FLAG: u8 = 0x80;

/// Location of a chunk inside a region file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLocation {
    pub sector_offset: u32,
    pub sector_count: u8,
}

/// Errors reading a chunk payload.
#[derive(Debug, Error)]
pub enum ChunkReadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid chunk length {length} for {sectors} sector(s)")]
    BadLength { length: u32, sectors: u8 },

    #[error("Unsupported chunk compression type {0}")]
    Compression(u8),

    #[error("Chunk is stored in an external .mcc file, which is not supported")]
    External,
}

/// File name of the region containing `cell`, e.g. `r.-1.0.mca`.
pub fn region_file_name(cell: CellCoord) -> String {
    let (rx, rz) = cell.region();
    format!("r.{}.{}.mca", rx, rz)
}

/// Reads the location table entry for `cell`.
///
/// Returns `None` when the chunk was never saved, or when the file is too
/// short to hold a header (a freshly created, empty region).
pub fn read_location(file: &mut File, cell: CellCoord) -> io::Result<Option<ChunkLocation>> {
    if file.metadata()?.len() < HEADER_SIZE {
        return Ok(None);
    }

    let (lx, lz) = cell.region_local();
    let index = ((lx + lz * 32) * 4) as u64;
    file.seek(SeekFrom::Start(index))?;

    let mut entry = [0u8; 4];
    file.read_exact(&mut entry)?;

    let sector_offset = u32::from_be_bytes([0, entry[0], entry[1], entry[2]]);
    let sector_count = entry[3];

    // Offsets 0 and 1 point into the header itself.
    if sector_offset < 2 || sector_count == 0 {
        return Ok(None);
    }

    Ok(Some(ChunkLocation {
        sector_offset,
        sector_count,
    }))
}

/// Reads and decompresses the NBT payload of a chunk.
pub fn read_chunk(file: &mut File, location: ChunkLocation) -> Result<Vec<u8>, ChunkReadError> {
    file.seek(SeekFrom::Start(location.sector_offset as u64 * SECTOR_SIZE))?;

    let mut header = [0u8; 5];
    file.read_exact(&mut header)?;
    let length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
    let compression = header[4];

    if compression & COMPRESSION_EXTERNAL_FLAG != 0 {
        return Err(ChunkReadError::External);
    }

    // The length counts the compression byte.
    let capacity = location.sector_count as u64 * SECTOR_SIZE;
    if length == 0 || length as u64 + 4 > capacity {
        return Err(ChunkReadError::BadLength {
            length,
            sectors: location.sector_count,
        });
    }

    let mut payload = vec![0u8; length as usize - 1];
    file.read_exact(&mut payload)?;

    decompress(compression, &payload)
}

fn decompress(compression: u8, payload: &[u8]) -> Result<Vec<u8>, ChunkReadError> {
    let mut out = Vec::new();
    match compression {
        COMPRESSION_GZIP => {
            GzDecoder::new(payload).read_to_end(&mut out)?;
        }
        COMPRESSION_ZLIB => {
            ZlibDecoder::new(payload).read_to_end(&mut out)?;
        }
        COMPRESSION_NONE => out.extend_from_slice(payload),
        other => return Err(ChunkReadError::Compression(other)),
    }
    Ok(out)
}
