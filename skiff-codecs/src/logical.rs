//! Codec for boolean columns, stored as 32-bit words.

use std::io::{Read, Seek, Write};

use arrow::array::{Array, BooleanArray};

use crate::blocks;
use crate::compression::Compression;
use crate::error::CodecResult;

/// The effective compression level is capped at the LZ4 range for the
/// 32-bit word expansion of booleans.
const LEVEL_CAP: u8 = 50;

/// Write a whole logical column. Returns the bytes written.
pub fn write_logical_column<W: Write + Seek>(
    out: &mut W,
    column: &BooleanArray,
    compression_level: u8,
) -> CodecResult<u64> {
    let words: Vec<i32> = (0..column.len())
        .map(|row| i32::from(column.value(row)))
        .collect();
    blocks::write_fixed(
        out,
        &words,
        Compression::from_level(compression_level.min(LEVEL_CAP)),
    )
}

/// Read `length` rows starting at `first_row` from a logical column rooted
/// at `offset`. Any non-zero word decodes as `true`.
pub fn read_logical_column<R: Read + Seek>(
    file: &mut R,
    offset: u64,
    first_row: u64,
    length: u64,
    total_rows: u64,
) -> CodecResult<BooleanArray> {
    let words = blocks::read_fixed::<i32, _>(file, offset, first_row, length, total_rows)?;
    Ok(BooleanArray::from(
        words.iter().map(|&word| word != 0).collect::<Vec<bool>>(),
    ))
}
