//! Shared block framing used by the fixed-width codecs.
//!
//! Every codec stream starts with the same 8-byte sub-header: the algorithm
//! tag, a reserved `u16`, and the block row count. A stored fixed-width
//! column is followed directly by its little-endian records, so a row range
//! is one seek away. A compressed column is followed by a block directory
//! (one `u64` offset per block plus an end sentinel, relative to the end of
//! the directory) and then the blocks themselves, each prefixed with its
//! `u32` uncompressed byte size.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::compression::{self, Compression, ALGORITHM_STORED, BLOCK_ROWS};
use crate::error::{CodecError, CodecResult};

/// Size of the common codec sub-header.
pub(crate) const CODEC_HEADER_SIZE: u64 = 8;

/// A value with a fixed little-endian on-disk width.
pub(crate) trait FixedElement: Copy {
    const WIDTH: usize;

    fn encode_into(self, out: &mut Vec<u8>);
    fn decode(bytes: &[u8]) -> Self;
}

impl FixedElement for i32 {
    const WIDTH: usize = 4;

    fn encode_into(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> Self {
        i32::from_le_bytes(bytes[..4].try_into().expect("4-byte slice"))
    }
}

impl FixedElement for f64 {
    const WIDTH: usize = 8;

    fn encode_into(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> Self {
        f64::from_le_bytes(bytes[..8].try_into().expect("8-byte slice"))
    }
}

pub(crate) struct CodecHeader {
    pub algorithm: u16,
    pub block_rows: u32,
}

pub(crate) fn encode_codec_header(compression: Compression, block_rows: u32) -> [u8; 8] {
    let mut header = [0u8; 8];
    header[0..2].copy_from_slice(&compression.tag().to_le_bytes());
    header[4..8].copy_from_slice(&block_rows.to_le_bytes());
    header
}

pub(crate) fn read_codec_header<R: Read>(file: &mut R) -> CodecResult<CodecHeader> {
    let mut raw = [0u8; 8];
    file.read_exact(&mut raw)?;
    let algorithm = u16::from_le_bytes(raw[0..2].try_into().expect("2-byte slice"));
    let block_rows = u32::from_le_bytes(raw[4..8].try_into().expect("4-byte slice"));
    if block_rows == 0 {
        return Err(CodecError::Corrupt(
            "codec sub-header declares zero rows per block".to_string(),
        ));
    }
    Ok(CodecHeader {
        algorithm,
        block_rows,
    })
}

/// Frame a compressed block: `u32` uncompressed size, then the payload.
pub(crate) fn encode_compressed_block(
    compression: Compression,
    image: &[u8],
) -> CodecResult<Vec<u8>> {
    let compressed = compression.compress(image)?;
    let mut payload = Vec::with_capacity(4 + compressed.len());
    payload.extend_from_slice(&(image.len() as u32).to_le_bytes());
    payload.extend_from_slice(&compressed);
    Ok(payload)
}

/// Recover a block's uncompressed image from its framed payload.
pub(crate) fn decode_compressed_block(algorithm: u16, payload: &[u8]) -> CodecResult<Vec<u8>> {
    if payload.len() < 4 {
        return Err(CodecError::Corrupt(
            "compressed block payload is shorter than its size prefix".to_string(),
        ));
    }
    let uncompressed_len =
        u32::from_le_bytes(payload[0..4].try_into().expect("4-byte slice")) as usize;
    compression::decompress(algorithm, &payload[4..], uncompressed_len)
}

/// Read directory entries `first..first + count` of a block directory
/// rooted at `directory_base`.
pub(crate) fn read_directory<R: Read + Seek>(
    file: &mut R,
    directory_base: u64,
    first: u64,
    count: u64,
) -> CodecResult<Vec<u64>> {
    file.seek(SeekFrom::Start(directory_base + first * 8))?;
    let mut raw = vec![0u8; (count as usize) * 8];
    file.read_exact(&mut raw)?;
    let entries: Vec<u64> = raw
        .chunks_exact(8)
        .map(|chunk| u64::from_le_bytes(chunk.try_into().expect("8-byte slice")))
        .collect();
    if entries.windows(2).any(|pair| pair[0] > pair[1]) {
        return Err(CodecError::Corrupt(
            "block directory offsets are not monotonic".to_string(),
        ));
    }
    Ok(entries)
}

/// Write a fixed-width column: sub-header, then either raw records
/// (stored) or a block directory plus compressed blocks. Returns the bytes
/// written.
pub(crate) fn write_fixed<T: FixedElement, W: Write + Seek>(
    out: &mut W,
    values: &[T],
    compression: Compression,
) -> CodecResult<u64> {
    let start = out.stream_position()?;
    out.write_all(&encode_codec_header(compression, BLOCK_ROWS))?;

    if compression == Compression::Stored {
        let mut buf = Vec::with_capacity((BLOCK_ROWS as usize) * T::WIDTH);
        for chunk in values.chunks(BLOCK_ROWS as usize) {
            buf.clear();
            for &value in chunk {
                value.encode_into(&mut buf);
            }
            out.write_all(&buf)?;
        }
    } else {
        let mut payloads = Vec::with_capacity(values.len().div_ceil(BLOCK_ROWS as usize));
        let mut image = Vec::with_capacity((BLOCK_ROWS as usize) * T::WIDTH);
        for chunk in values.chunks(BLOCK_ROWS as usize) {
            image.clear();
            for &value in chunk {
                value.encode_into(&mut image);
            }
            payloads.push(encode_compressed_block(compression, &image)?);
        }
        write_directory_and_payloads(out, &payloads)?;
    }

    Ok(out.stream_position()? - start)
}

/// Write the block directory followed by the block payloads.
pub(crate) fn write_directory_and_payloads<W: Write>(
    out: &mut W,
    payloads: &[Vec<u8>],
) -> CodecResult<()> {
    let mut offset = 0u64;
    let mut directory = Vec::with_capacity((payloads.len() + 1) * 8);
    for payload in payloads {
        directory.extend_from_slice(&offset.to_le_bytes());
        offset += payload.len() as u64;
    }
    directory.extend_from_slice(&offset.to_le_bytes());
    out.write_all(&directory)?;
    for payload in payloads {
        out.write_all(payload)?;
    }
    Ok(())
}

/// Read `length` records starting at `first_row` from a fixed-width column
/// rooted at `offset`. `total_rows` sizes the final, short block.
pub(crate) fn read_fixed<T: FixedElement, R: Read + Seek>(
    file: &mut R,
    offset: u64,
    first_row: u64,
    length: u64,
    total_rows: u64,
) -> CodecResult<Vec<T>> {
    if length == 0 {
        return Ok(Vec::new());
    }

    file.seek(SeekFrom::Start(offset))?;
    let header = read_codec_header(file)?;
    let width = T::WIDTH as u64;

    if header.algorithm == ALGORITHM_STORED {
        file.seek(SeekFrom::Start(offset + CODEC_HEADER_SIZE + first_row * width))?;
        let mut raw = vec![0u8; (length * width) as usize];
        file.read_exact(&mut raw)?;
        return Ok(raw.chunks_exact(T::WIDTH).map(T::decode).collect());
    }

    let block_rows = u64::from(header.block_rows);
    let block_count = total_rows.div_ceil(block_rows);
    let first_block = first_row / block_rows;
    let last_block = (first_row + length - 1) / block_rows;
    let directory_base = offset + CODEC_HEADER_SIZE;
    let data_base = directory_base + (block_count + 1) * 8;

    let directory = read_directory(
        file,
        directory_base,
        first_block,
        last_block - first_block + 2,
    )?;

    file.seek(SeekFrom::Start(data_base + directory[0]))?;
    let mut span = vec![0u8; (directory[directory.len() - 1] - directory[0]) as usize];
    file.read_exact(&mut span)?;

    let mut values = Vec::with_capacity(length as usize);
    for (slot, block) in (first_block..=last_block).enumerate() {
        let payload_start = (directory[slot] - directory[0]) as usize;
        let payload_end = (directory[slot + 1] - directory[0]) as usize;
        let image = decode_compressed_block(header.algorithm, &span[payload_start..payload_end])?;

        let block_first = block * block_rows;
        let rows_in_block = block_rows.min(total_rows - block_first);
        if image.len() as u64 != rows_in_block * width {
            return Err(CodecError::Corrupt(format!(
                "block {} decoded to {} bytes, expected {}",
                block,
                image.len(),
                rows_in_block * width
            )));
        }

        let from = first_row.max(block_first) - block_first;
        let to = (first_row + length).min(block_first + rows_in_block) - block_first;
        for row in from..to {
            values.push(T::decode(&image[(row * width) as usize..]));
        }
    }

    Ok(values)
}
