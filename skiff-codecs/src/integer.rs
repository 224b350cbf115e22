//! Codec for 32-bit integer columns.

use std::io::{Read, Seek, Write};

use arrow::array::Int32Array;

use crate::blocks;
use crate::compression::Compression;
use crate::error::CodecResult;

/// Write a whole integer column. Returns the bytes written.
pub fn write_int32_column<W: Write + Seek>(
    out: &mut W,
    column: &Int32Array,
    compression_level: u8,
) -> CodecResult<u64> {
    blocks::write_fixed(out, column.values(), Compression::from_level(compression_level))
}

/// Read `length` rows starting at `first_row` from an integer column
/// rooted at `offset`.
pub fn read_int32_column<R: Read + Seek>(
    file: &mut R,
    offset: u64,
    first_row: u64,
    length: u64,
    total_rows: u64,
) -> CodecResult<Int32Array> {
    let values = blocks::read_fixed::<i32, _>(file, offset, first_row, length, total_rows)?;
    Ok(Int32Array::from(values))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn slice_round_trip() {
        let column = Int32Array::from_iter_values((0..9_000).map(|v| v * 7 - 3));
        for level in [0u8, 30, 85] {
            let mut cursor = Cursor::new(Vec::new());
            write_int32_column(&mut cursor, &column, level).expect("write");
            let restored =
                read_int32_column(&mut cursor, 0, 4_000, 500, 9_000).expect("read");
            assert_eq!(&restored.values()[..], &column.values()[4_000..4_500]);
        }
    }
}
