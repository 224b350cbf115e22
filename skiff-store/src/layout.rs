//! On-disk layout: format constants and the fixed-size header and index
//! blocks with their dedicated encode/decode functions.
//!
//! All integers are little-endian. Blocks are encoded into sized byte
//! buffers field by field; nothing here aliases memory as a structure.

use skiff_common::ColumnType;

use crate::error::StructuralError;

/// File identity constant. A file that does not start with this value is
/// not a skiff store file, whatever else it contains.
pub const FILE_MAGIC: u64 = u64::from_le_bytes(*b"SKIFCOL1");

/// Version written into new files.
pub const FORMAT_VERSION: u32 = 1;

/// Highest version this build can read.
pub const MAX_SUPPORTED_VERSION: u32 = FORMAT_VERSION;

/// Size of the fixed header prefix: magic, version, table class, key
/// count, column count. Read first because the two counts size everything
/// that follows.
pub const TABLE_HEADER_SIZE: usize = 24;

/// Size of the fixed part of the chunkset sub-header: two reserved
/// next-chunkset offsets, row count, version, column count.
pub const CHUNKSET_HEADER_SIZE: usize = 32;

/// Size of the fixed chunk index block: 8 chunk offset slots, 8 chunk row
/// count slots, chunks-per-index-row, chunk count.
pub const CHUNK_INDEX_SIZE: usize = 144;

/// Reserved chunk slots per index row. Only slot 0 is in use today.
pub const CHUNK_SLOTS: usize = 8;

/// The only table class ever written. Parsed but never branched on.
pub const TABLE_CLASS_DEFAULT: u32 = 1;

fn get_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes(buf[at..at + 2].try_into().expect("2-byte slice"))
}

fn get_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(buf[at..at + 4].try_into().expect("4-byte slice"))
}

fn get_u64(buf: &[u8], at: usize) -> u64 {
    u64::from_le_bytes(buf[at..at + 8].try_into().expect("8-byte slice"))
}

/// Decoded fixed header prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderPrefix {
    pub format_version: u32,
    pub table_class: u32,
    pub key_count: u32,
    pub column_count: u32,
}

impl HeaderPrefix {
    /// Validate identity and version, then expose the two counts that size
    /// the variable remainder of the header.
    pub fn decode(raw: &[u8; TABLE_HEADER_SIZE]) -> Result<Self, StructuralError> {
        if get_u64(raw, 0) != FILE_MAGIC {
            return Err(StructuralError::UnrecognizedFile);
        }
        let format_version = get_u32(raw, 8);
        if format_version > MAX_SUPPORTED_VERSION {
            return Err(StructuralError::IncompatibleVersion {
                found: format_version,
                supported: MAX_SUPPORTED_VERSION,
            });
        }
        let prefix = Self {
            format_version,
            table_class: get_u32(raw, 12),
            key_count: get_u32(raw, 16),
            column_count: get_u32(raw, 20),
        };
        if prefix.column_count == 0 {
            return Err(StructuralError::Corrupt(
                "file header declares no columns".to_string(),
            ));
        }
        Ok(prefix)
    }
}

/// The variable-length remainder of the header: key positions, the
/// chunkset sub-header, and the per-column tag blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBody {
    pub key_positions: Vec<u32>,
    /// Reserved linkage to a horizontally appended chunkset. Always 0.
    pub next_horizontal_chunkset: u64,
    /// Reserved linkage to a vertically appended chunkset. Always 0.
    pub next_vertical_chunkset: u64,
    pub row_count: u64,
    pub chunkset_version: u32,
    pub chunkset_column_count: u32,
    pub column_types: Vec<u16>,
    pub base_types: Vec<u16>,
}

impl HeaderBody {
    pub fn byte_size(key_count: u32, column_count: u32) -> usize {
        4 * key_count as usize + CHUNKSET_HEADER_SIZE + 6 * column_count as usize
    }

    pub fn decode(raw: &[u8], key_count: u32, column_count: u32) -> Result<Self, StructuralError> {
        let keys = key_count as usize;
        let columns = column_count as usize;
        debug_assert_eq!(raw.len(), Self::byte_size(key_count, column_count));

        let key_positions = (0..keys).map(|i| get_u32(raw, 4 * i)).collect();
        let chunkset = 4 * keys;
        // The per-column attribute tags between the chunkset sub-header and
        // the type tags are reserved space: allocated, written as zeros,
        // and skipped here.
        let types = chunkset + CHUNKSET_HEADER_SIZE + 2 * columns;
        let bases = types + 2 * columns;

        let body = Self {
            key_positions,
            next_horizontal_chunkset: get_u64(raw, chunkset),
            next_vertical_chunkset: get_u64(raw, chunkset + 8),
            row_count: get_u64(raw, chunkset + 16),
            chunkset_version: get_u32(raw, chunkset + 24),
            chunkset_column_count: get_u32(raw, chunkset + 28),
            column_types: (0..columns).map(|i| get_u16(raw, types + 2 * i)).collect(),
            base_types: (0..columns).map(|i| get_u16(raw, bases + 2 * i)).collect(),
        };

        if body.chunkset_column_count != column_count {
            return Err(StructuralError::Corrupt(format!(
                "chunkset declares {} columns but the table header declares {}",
                body.chunkset_column_count, column_count
            )));
        }
        if body.row_count == 0 {
            return Err(StructuralError::Corrupt(
                "chunkset declares zero rows".to_string(),
            ));
        }
        Ok(body)
    }
}

/// The full header block as written at the start of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub prefix: HeaderPrefix,
    pub body: HeaderBody,
}

impl FileHeader {
    /// Assemble the header for a new file in the current format version.
    pub fn new(key_positions: Vec<u32>, column_types: &[ColumnType], row_count: u64) -> Self {
        let column_count = column_types.len() as u32;
        Self {
            prefix: HeaderPrefix {
                format_version: FORMAT_VERSION,
                table_class: TABLE_CLASS_DEFAULT,
                key_count: key_positions.len() as u32,
                column_count,
            },
            body: HeaderBody {
                key_positions,
                next_horizontal_chunkset: 0,
                next_vertical_chunkset: 0,
                row_count,
                chunkset_version: FORMAT_VERSION,
                chunkset_column_count: column_count,
                column_types: column_types.iter().map(|t| t.tag()).collect(),
                base_types: column_types.iter().map(|t| t.base_type().tag()).collect(),
            },
        }
    }

    pub fn byte_size(&self) -> usize {
        TABLE_HEADER_SIZE + HeaderBody::byte_size(self.prefix.key_count, self.prefix.column_count)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.byte_size());
        buf.extend_from_slice(&FILE_MAGIC.to_le_bytes());
        buf.extend_from_slice(&self.prefix.format_version.to_le_bytes());
        buf.extend_from_slice(&self.prefix.table_class.to_le_bytes());
        buf.extend_from_slice(&self.prefix.key_count.to_le_bytes());
        buf.extend_from_slice(&self.prefix.column_count.to_le_bytes());
        for &position in &self.body.key_positions {
            buf.extend_from_slice(&position.to_le_bytes());
        }
        buf.extend_from_slice(&self.body.next_horizontal_chunkset.to_le_bytes());
        buf.extend_from_slice(&self.body.next_vertical_chunkset.to_le_bytes());
        buf.extend_from_slice(&self.body.row_count.to_le_bytes());
        buf.extend_from_slice(&self.body.chunkset_version.to_le_bytes());
        buf.extend_from_slice(&self.body.chunkset_column_count.to_le_bytes());
        // Reserved per-column attribute tags.
        buf.resize(buf.len() + 2 * self.prefix.column_count as usize, 0);
        for &tag in &self.body.column_types {
            buf.extend_from_slice(&tag.to_le_bytes());
        }
        for &tag in &self.body.base_types {
            buf.extend_from_slice(&tag.to_le_bytes());
        }
        debug_assert_eq!(buf.len(), self.byte_size());
        buf
    }
}

/// The chunk index: reserved chunk slots, chunk bookkeeping, and one byte
/// offset per column payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkIndex {
    pub chunk_offsets: [u64; CHUNK_SLOTS],
    pub chunk_row_counts: [u64; CHUNK_SLOTS],
    pub chunks_per_index_row: u64,
    pub chunk_count: u64,
    pub column_offsets: Vec<u64>,
}

impl ChunkIndex {
    /// The index as first written, before column offsets are known: chunk
    /// bookkeeping and the row count filled, every offset zero.
    pub fn placeholder(row_count: u64, column_count: usize) -> Self {
        let mut chunk_row_counts = [0u64; CHUNK_SLOTS];
        chunk_row_counts[0] = row_count;
        Self {
            chunk_offsets: [0; CHUNK_SLOTS],
            chunk_row_counts,
            chunks_per_index_row: 1,
            chunk_count: 1,
            column_offsets: vec![0; column_count],
        }
    }

    pub fn byte_size(column_count: usize) -> usize {
        CHUNK_INDEX_SIZE + 8 * column_count
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::byte_size(self.column_offsets.len()));
        for &offset in &self.chunk_offsets {
            buf.extend_from_slice(&offset.to_le_bytes());
        }
        for &rows in &self.chunk_row_counts {
            buf.extend_from_slice(&rows.to_le_bytes());
        }
        buf.extend_from_slice(&self.chunks_per_index_row.to_le_bytes());
        buf.extend_from_slice(&self.chunk_count.to_le_bytes());
        for &offset in &self.column_offsets {
            buf.extend_from_slice(&offset.to_le_bytes());
        }
        buf
    }

    pub fn decode(raw: &[u8], column_count: usize) -> Self {
        debug_assert_eq!(raw.len(), Self::byte_size(column_count));
        let mut chunk_offsets = [0u64; CHUNK_SLOTS];
        let mut chunk_row_counts = [0u64; CHUNK_SLOTS];
        for slot in 0..CHUNK_SLOTS {
            chunk_offsets[slot] = get_u64(raw, 8 * slot);
            chunk_row_counts[slot] = get_u64(raw, 64 + 8 * slot);
        }
        Self {
            chunk_offsets,
            chunk_row_counts,
            chunks_per_index_row: get_u64(raw, 128),
            chunk_count: get_u64(raw, 136),
            column_offsets: (0..column_count)
                .map(|i| get_u64(raw, CHUNK_INDEX_SIZE + 8 * i))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_change_these_constants() {
        assert_eq!(FILE_MAGIC, u64::from_le_bytes(*b"SKIFCOL1"));
        assert_eq!(TABLE_HEADER_SIZE, 24);
        assert_eq!(CHUNKSET_HEADER_SIZE, 32);
        assert_eq!(CHUNK_INDEX_SIZE, 144);
        assert_eq!(CHUNK_SLOTS, 8);
    }

    #[test]
    fn header_round_trip() {
        let header = FileHeader::new(
            vec![2, 0],
            &[ColumnType::Character, ColumnType::Int32, ColumnType::Double],
            1_000,
        );
        let raw = header.encode();
        assert_eq!(raw.len(), header.byte_size());

        let prefix =
            HeaderPrefix::decode(raw[..TABLE_HEADER_SIZE].try_into().expect("prefix slice"))
                .expect("prefix");
        assert_eq!(prefix, header.prefix);

        let body = HeaderBody::decode(
            &raw[TABLE_HEADER_SIZE..],
            prefix.key_count,
            prefix.column_count,
        )
        .expect("body");
        assert_eq!(body, header.body);
    }

    #[test]
    fn foreign_magic_is_not_corruption() {
        let mut raw = FileHeader::new(vec![], &[ColumnType::Int32], 10).encode();
        raw[0] ^= 0xff;
        assert!(matches!(
            HeaderPrefix::decode(raw[..TABLE_HEADER_SIZE].try_into().expect("prefix slice")),
            Err(StructuralError::UnrecognizedFile)
        ));
    }

    #[test]
    fn future_version_is_gated() {
        let mut header = FileHeader::new(vec![], &[ColumnType::Int32], 10);
        header.prefix.format_version = MAX_SUPPORTED_VERSION + 1;
        let raw = header.encode();
        assert!(matches!(
            HeaderPrefix::decode(raw[..TABLE_HEADER_SIZE].try_into().expect("prefix slice")),
            Err(StructuralError::IncompatibleVersion { .. })
        ));
    }

    #[test]
    fn chunk_index_round_trip() {
        let mut index = ChunkIndex::placeholder(500, 4);
        index.chunk_offsets[0] = 4_096;
        index.column_offsets = vec![4_128, 8_000, 9_000, 12_345];
        let raw = index.encode();
        assert_eq!(raw.len(), ChunkIndex::byte_size(4));
        assert_eq!(ChunkIndex::decode(&raw, 4), index);
    }
}
