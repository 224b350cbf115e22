//! Codec for dictionary-encoded string columns.
//!
//! A factor column is two payloads behind one 16-byte sub-header: the level
//! table (the dictionary values, serialized through the character codec
//! layout) and the codes (the dictionary keys, serialized through the
//! fixed-width integer layout). Levels are always decoded in full; only the
//! requested slice of codes is.

use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use arrow::array::{Array, AsArray, DictionaryArray, Int32Array};
use arrow::datatypes::Int32Type;
use std::sync::Arc;

use crate::blocks;
use crate::character;
use crate::compression::Compression;
use crate::error::{CodecError, CodecResult};

/// Size of the factor sub-header: levels byte size, level count, reserved.
const FACTOR_HEADER_SIZE: u64 = 16;

/// Write a whole factor column. Returns the bytes written.
pub fn write_factor_column<W: Write + Seek>(
    out: &mut W,
    column: &DictionaryArray<Int32Type>,
    compression_level: u8,
) -> CodecResult<u64> {
    let start = out.stream_position()?;
    let levels = column.values().as_string::<i32>();

    // The sub-header records the levels' encoded size, which is only known
    // once they are serialized; stage them in memory first.
    let mut staged = Cursor::new(Vec::new());
    character::write_string_column(&mut staged, levels, compression_level)?;
    let level_bytes = staged.into_inner();

    let mut header = [0u8; FACTOR_HEADER_SIZE as usize];
    header[0..8].copy_from_slice(&(level_bytes.len() as u64).to_le_bytes());
    header[8..12].copy_from_slice(&(levels.len() as u32).to_le_bytes());
    out.write_all(&header)?;
    out.write_all(&level_bytes)?;

    blocks::write_fixed(
        out,
        column.keys().values(),
        Compression::from_level(compression_level),
    )?;

    Ok(out.stream_position()? - start)
}

/// Read `length` rows starting at `first_row` from a factor column rooted
/// at `offset`.
pub fn read_factor_column<R: Read + Seek>(
    file: &mut R,
    offset: u64,
    first_row: u64,
    length: u64,
    total_rows: u64,
) -> CodecResult<DictionaryArray<Int32Type>> {
    file.seek(SeekFrom::Start(offset))?;
    let mut header = [0u8; FACTOR_HEADER_SIZE as usize];
    file.read_exact(&mut header)?;
    let level_bytes = u64::from_le_bytes(header[0..8].try_into().expect("8-byte slice"));
    let level_count = u32::from_le_bytes(header[8..12].try_into().expect("4-byte slice"));

    let levels = character::read_string_column(
        file,
        offset + FACTOR_HEADER_SIZE,
        0,
        u64::from(level_count),
        u64::from(level_count),
    )?;
    let codes = blocks::read_fixed::<i32, _>(
        file,
        offset + FACTOR_HEADER_SIZE + level_bytes,
        first_row,
        length,
        total_rows,
    )?;

    for &code in &codes {
        if code < 0 || code as u32 >= level_count {
            return Err(CodecError::Corrupt(format!(
                "factor code {} is outside the level table of {} entries",
                code, level_count
            )));
        }
    }

    DictionaryArray::try_new(Int32Array::from(codes), Arc::new(levels))
        .map_err(CodecError::from)
}
