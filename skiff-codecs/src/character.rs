//! Codec for variable-width UTF-8 string columns.
//!
//! Also used by the store layer for the column-name block, which is always
//! written with the level forced to zero so that names stay readable before
//! anything else about the file is known.
//!
//! Block image layout: one `u32` byte length per row, then the block's
//! string bytes concatenated. The block directory is present even for
//! stored columns because string blocks are variable-sized; `total_rows`
//! is enough to reconstruct the block count, which is what lets a reader
//! skip whole blocks of undecoded rows.

use std::io::{Read, Seek, SeekFrom, Write};

use arrow::array::{Array, StringArray, StringBuilder};

use crate::blocks::{self, CODEC_HEADER_SIZE};
use crate::compression::{Compression, ALGORITHM_STORED, BLOCK_ROWS};
use crate::error::{CodecError, CodecResult};

/// Write a whole string column. Returns the bytes written.
pub fn write_string_column<W: Write + Seek>(
    out: &mut W,
    values: &StringArray,
    compression_level: u8,
) -> CodecResult<u64> {
    let start = out.stream_position()?;
    let compression = Compression::from_level(compression_level);
    out.write_all(&blocks::encode_codec_header(compression, BLOCK_ROWS))?;

    let total = values.len();
    let mut payloads = Vec::with_capacity(total.div_ceil(BLOCK_ROWS as usize));
    for block_start in (0..total).step_by(BLOCK_ROWS as usize) {
        let block_end = total.min(block_start + BLOCK_ROWS as usize);
        let mut image = Vec::new();
        for row in block_start..block_end {
            image.extend_from_slice(&(values.value(row).len() as u32).to_le_bytes());
        }
        for row in block_start..block_end {
            image.extend_from_slice(values.value(row).as_bytes());
        }
        let payload = match compression {
            Compression::Stored => image,
            _ => blocks::encode_compressed_block(compression, &image)?,
        };
        payloads.push(payload);
    }
    blocks::write_directory_and_payloads(out, &payloads)?;

    Ok(out.stream_position()? - start)
}

/// Read `length` rows starting at `first_row` from a string column rooted
/// at `offset`. Only the blocks covering the range are decoded.
pub fn read_string_column<R: Read + Seek>(
    file: &mut R,
    offset: u64,
    first_row: u64,
    length: u64,
    total_rows: u64,
) -> CodecResult<StringArray> {
    let mut builder = StringBuilder::new();
    if length == 0 {
        return Ok(builder.finish());
    }

    file.seek(SeekFrom::Start(offset))?;
    let header = blocks::read_codec_header(file)?;
    let block_rows = u64::from(header.block_rows);
    let block_count = total_rows.div_ceil(block_rows);
    let first_block = first_row / block_rows;
    let last_block = (first_row + length - 1) / block_rows;
    let directory_base = offset + CODEC_HEADER_SIZE;
    let data_base = directory_base + (block_count + 1) * 8;

    let directory = blocks::read_directory(
        file,
        directory_base,
        first_block,
        last_block - first_block + 2,
    )?;

    file.seek(SeekFrom::Start(data_base + directory[0]))?;
    let mut span = vec![0u8; (directory[directory.len() - 1] - directory[0]) as usize];
    file.read_exact(&mut span)?;

    for (slot, block) in (first_block..=last_block).enumerate() {
        let payload_start = (directory[slot] - directory[0]) as usize;
        let payload_end = (directory[slot + 1] - directory[0]) as usize;
        let payload = &span[payload_start..payload_end];

        let decoded;
        let image: &[u8] = if header.algorithm == ALGORITHM_STORED {
            payload
        } else {
            decoded = blocks::decode_compressed_block(header.algorithm, payload)?;
            &decoded
        };

        let block_first = block * block_rows;
        let rows_in_block = (block_rows.min(total_rows - block_first)) as usize;
        let lengths_size = rows_in_block * 4;
        if image.len() < lengths_size {
            return Err(CodecError::Corrupt(format!(
                "string block {} is too short for its row lengths",
                block
            )));
        }
        let lengths: Vec<usize> = image[..lengths_size]
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes(chunk.try_into().expect("4-byte slice")) as usize)
            .collect();
        let data = &image[lengths_size..];
        if data.len() != lengths.iter().sum::<usize>() {
            return Err(CodecError::Corrupt(format!(
                "string block {} length table disagrees with its data size",
                block
            )));
        }

        let from = (first_row.max(block_first) - block_first) as usize;
        let to = ((first_row + length).min(block_first + rows_in_block as u64) - block_first)
            as usize;
        let mut byte_pos: usize = lengths[..from].iter().sum();
        for row in from..to {
            let text = std::str::from_utf8(&data[byte_pos..byte_pos + lengths[row]])
                .map_err(|_| CodecError::InvalidUtf8)?;
            builder.append_value(text);
            byte_pos += lengths[row];
        }
    }

    Ok(builder.finish())
}

/// Total encoded size of a string column rooted at `offset`, derived from
/// its sub-header and the final block directory entry. The store layer uses
/// this to locate whatever follows a name block.
pub fn encoded_size<R: Read + Seek>(
    file: &mut R,
    offset: u64,
    total_rows: u64,
) -> CodecResult<u64> {
    file.seek(SeekFrom::Start(offset))?;
    let header = blocks::read_codec_header(file)?;
    let block_count = total_rows.div_ceil(u64::from(header.block_rows));
    let directory_base = offset + CODEC_HEADER_SIZE;
    let end = blocks::read_directory(file, directory_base, block_count, 1)?[0];
    Ok(CODEC_HEADER_SIZE + (block_count + 1) * 8 + end)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn sample(total: usize) -> StringArray {
        StringArray::from_iter_values((0..total).map(|row| match row % 5 {
            0 => String::new(),
            1 => format!("row-{row}"),
            2 => "naïve café — ünïcodé".to_string(),
            3 => "x".repeat(row % 97),
            _ => format!("{row}"),
        }))
    }

    fn round_trip(level: u8, first: u64, length: u64, total: usize) {
        let values = sample(total);
        let mut cursor = Cursor::new(Vec::new());
        let written = write_string_column(&mut cursor, &values, level).expect("write");
        assert_eq!(written, cursor.get_ref().len() as u64);
        assert_eq!(
            encoded_size(&mut cursor, 0, total as u64).expect("size"),
            written
        );

        let restored =
            read_string_column(&mut cursor, 0, first, length, total as u64).expect("read");
        assert_eq!(restored.len() as u64, length);
        for row in 0..length as usize {
            assert_eq!(restored.value(row), values.value(first as usize + row));
        }
    }

    #[test]
    fn stored_round_trip() {
        round_trip(0, 0, 100, 100);
        round_trip(0, 40, 11, 100);
    }

    #[test]
    fn compressed_round_trip_across_blocks() {
        round_trip(30, 0, 10_000, 10_000);
        round_trip(30, 4_000, 4_200, 10_000);
        round_trip(85, 4_095, 2, 10_000);
        round_trip(85, 9_990, 10, 10_000);
    }

    #[test]
    fn single_row() {
        round_trip(0, 0, 1, 1);
        round_trip(75, 0, 1, 1);
    }
}
