//! Mapping from the uniform 0-100 compression level to concrete algorithms.

use crate::error::{CodecError, CodecResult};

/// Highest accepted compression level.
pub const LEVEL_MAX: u8 = 100;

/// Rows per compression block. Every codec cuts its column into blocks of
/// this many rows so a reader can decompress only the blocks covering a
/// requested row range.
pub const BLOCK_ROWS: u32 = 4096;

/// Algorithm tag values as written into codec sub-headers.
pub const ALGORITHM_STORED: u16 = 0;
pub const ALGORITHM_LZ4: u16 = 1;
pub const ALGORITHM_ZSTD: u16 = 2;

/// The concrete compression scheme selected for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Values are written as-is.
    Stored,
    /// LZ4 block compression.
    Lz4,
    /// Zstandard with the given inner level.
    Zstd { level: i32 },
}

impl Compression {
    /// Select a scheme for a 0-100 level: 0 is stored, 1-50 is LZ4 and
    /// 51-100 is Zstandard with the inner level scaled over 1..=19.
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Self::Stored,
            1..=50 => Self::Lz4,
            _ => Self::Zstd {
                level: 1 + (i32::from(level.min(LEVEL_MAX)) - 51) * 18 / 49,
            },
        }
    }

    /// The sub-header tag for this scheme.
    pub fn tag(self) -> u16 {
        match self {
            Self::Stored => ALGORITHM_STORED,
            Self::Lz4 => ALGORITHM_LZ4,
            Self::Zstd { .. } => ALGORITHM_ZSTD,
        }
    }

    /// Compress one block. Must not be called for `Stored`.
    pub fn compress(self, data: &[u8]) -> CodecResult<Vec<u8>> {
        match self {
            Self::Stored => Err(CodecError::Corrupt(
                "attempted to compress a stored block".to_string(),
            )),
            Self::Lz4 => Ok(lz4_flex::block::compress(data)),
            Self::Zstd { level } => {
                zstd::bulk::compress(data, level).map_err(CodecError::Io)
            }
        }
    }
}

/// Decompress one block identified by its sub-header algorithm tag.
/// `uncompressed_len` is the exact decoded size recorded next to the block.
pub fn decompress(algorithm: u16, data: &[u8], uncompressed_len: usize) -> CodecResult<Vec<u8>> {
    match algorithm {
        ALGORITHM_LZ4 => lz4_flex::block::decompress(data, uncompressed_len)
            .map_err(|e| CodecError::Decompress(e.to_string())),
        ALGORITHM_ZSTD => zstd::bulk::decompress(data, uncompressed_len)
            .map_err(|e| CodecError::Decompress(e.to_string())),
        ALGORITHM_STORED => Err(CodecError::Corrupt(
            "stored blocks carry no compressed payload".to_string(),
        )),
        other => Err(CodecError::UnknownAlgorithm(other)),
    }
}
