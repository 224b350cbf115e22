//! Codec for 64-bit floating point columns.

use std::io::{Read, Seek, Write};

use arrow::array::Float64Array;

use crate::blocks;
use crate::compression::Compression;
use crate::error::CodecResult;

/// Write a whole double column. Returns the bytes written.
pub fn write_double_column<W: Write + Seek>(
    out: &mut W,
    column: &Float64Array,
    compression_level: u8,
) -> CodecResult<u64> {
    blocks::write_fixed(out, column.values(), Compression::from_level(compression_level))
}

/// Read `length` rows starting at `first_row` from a double column rooted
/// at `offset`.
pub fn read_double_column<R: Read + Seek>(
    file: &mut R,
    offset: u64,
    first_row: u64,
    length: u64,
    total_rows: u64,
) -> CodecResult<Float64Array> {
    let values = blocks::read_fixed::<f64, _>(file, offset, first_row, length, total_rows)?;
    Ok(Float64Array::from(values))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn slice_round_trip_preserves_bits() {
        let column = Float64Array::from_iter_values(
            (0..6_000).map(|v| if v % 100 == 0 { f64::NAN } else { f64::from(v) * 0.25 }),
        );
        for level in [0u8, 42, 90] {
            let mut cursor = Cursor::new(Vec::new());
            write_double_column(&mut cursor, &column, level).expect("write");
            let restored = read_double_column(&mut cursor, 0, 0, 6_000, 6_000).expect("read");
            for row in 0..6_000 {
                assert_eq!(
                    restored.value(row).to_bits(),
                    column.value(row).to_bits(),
                    "row {row}"
                );
            }
        }
    }
}
