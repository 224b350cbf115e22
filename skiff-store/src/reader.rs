//! Read paths: fast metadata introspection and full data-mode reads with
//! column selection and row slicing.
//!
//! Both modes share the same header decode protocol: the fixed prefix is
//! read first (it is the only way to learn the key and column counts that
//! size the rest of the header), identity and version are gated, then the
//! variable remainder and the name block are parsed. Metadata mode stops
//! there; its cost is proportional to the header, never the dataset. Data
//! mode continues into the chunk index and dispatches each selected column
//! to its codec with the column's recorded byte offset, so only the
//! requested slice is ever decoded.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, RecordBatch, RecordBatchOptions};
use arrow::datatypes::{Field, Schema};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use skiff_common::{BaseColumnType, ColumnType};
use skiff_codecs::{character, double, factor, integer, logical, CodecError};

use crate::error::{
    DataError, SchemaError, SkiffResult, StoreError, StructuralError, UnsupportedError,
};
use crate::layout::{ChunkIndex, HeaderBody, HeaderPrefix, TABLE_HEADER_SIZE};

/// Options for a data-mode read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadOptions {
    /// Columns to read, in the requested order. `None` reads every column
    /// in file order. A single unmatched name fails the whole read.
    pub columns: Option<Vec<String>>,
    /// First row to read, 1-based.
    pub from_row: u64,
    /// Last row to read, 1-based inclusive. `None` reads through the last
    /// row; a bound past the end is clamped, not rejected.
    pub to_row: Option<u64>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            columns: None,
            from_row: 1,
            to_row: None,
        }
    }
}

/// Everything metadata mode knows about a file, as one immutable value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMetadata {
    pub format_version: u32,
    pub table_class: u32,
    pub row_count: u64,
    pub key_positions: Vec<u32>,
    pub column_names: Vec<String>,
    pub column_types: Vec<ColumnType>,
    pub base_types: Vec<BaseColumnType>,
}

/// A data-mode read result: the selected columns in selection order, plus
/// the positions (within that order) of the key columns whose sort
/// guarantee survived the projection.
#[derive(Debug, Clone)]
pub struct ReadResult {
    pub batch: RecordBatch,
    pub key_index: Vec<usize>,
}

impl ReadResult {
    pub fn selected_column_names(&self) -> Vec<String> {
        self.batch
            .schema_ref()
            .fields()
            .iter()
            .map(|field| field.name().clone())
            .collect()
    }
}

struct ParsedHeader {
    prefix: HeaderPrefix,
    body: HeaderBody,
    column_names: Vec<String>,
    names_offset: u64,
}

fn read_exact_or_truncated<R: Read>(file: &mut R, buf: &mut [u8]) -> SkiffResult<()> {
    file.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            StoreError::Structural(StructuralError::Truncated)
        } else {
            StoreError::Io(e)
        }
    })
}

/// A short read inside a codec is the file ending early, the same
/// structural condition as a short read in the header blocks.
fn map_codec_error(error: CodecError) -> StoreError {
    match error {
        CodecError::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            StoreError::Structural(StructuralError::Truncated)
        }
        other => StoreError::Codec(other),
    }
}

fn parse_header(file: &mut BufReader<File>) -> SkiffResult<ParsedHeader> {
    let mut raw_prefix = [0u8; TABLE_HEADER_SIZE];
    read_exact_or_truncated(file, &mut raw_prefix)?;
    let prefix = HeaderPrefix::decode(&raw_prefix)?;

    let mut raw_body = vec![0u8; HeaderBody::byte_size(prefix.key_count, prefix.column_count)];
    read_exact_or_truncated(file, &mut raw_body)?;
    let body = HeaderBody::decode(&raw_body, prefix.key_count, prefix.column_count)?;

    let names_offset = (TABLE_HEADER_SIZE + raw_body.len()) as u64;
    let names = character::read_string_column(
        file,
        names_offset,
        0,
        u64::from(prefix.column_count),
        u64::from(prefix.column_count),
    )
    .map_err(map_codec_error)?;
    let column_names = (0..names.len()).map(|i| names.value(i).to_string()).collect();

    Ok(ParsedHeader {
        prefix,
        body,
        column_names,
        names_offset,
    })
}

fn open(path: &Path) -> SkiffResult<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

/// Read a file's metadata without touching the chunk index or any column
/// payload.
pub fn read_metadata(path: impl AsRef<Path>) -> SkiffResult<StoreMetadata> {
    let path = path.as_ref();
    let mut file = open(path)?;
    let parsed = parse_header(&mut file)?;

    let column_types = parsed
        .body
        .column_types
        .iter()
        .map(|&tag| ColumnType::from_tag(tag).ok_or(SchemaError::UnknownColumnType(tag)))
        .collect::<Result<Vec<_>, _>>()?;
    let base_types = parsed
        .body
        .base_types
        .iter()
        .map(|&tag| BaseColumnType::from_tag(tag).ok_or(SchemaError::UnknownBaseType(tag)))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        "Read metadata for {}: {} columns, {} rows",
        path.display(),
        parsed.prefix.column_count,
        parsed.body.row_count
    );

    Ok(StoreMetadata {
        format_version: parsed.prefix.format_version,
        table_class: parsed.prefix.table_class,
        row_count: parsed.body.row_count,
        key_positions: parsed.body.key_positions,
        column_names: parsed.column_names,
        column_types,
        base_types,
    })
}

/// Read a dataset, or a column/row selection of it, from a store file.
pub fn read_dataset(path: impl AsRef<Path>, options: &ReadOptions) -> SkiffResult<ReadResult> {
    let path = path.as_ref();
    let mut file = open(path)?;
    let parsed = parse_header(&mut file)?;
    let column_count = parsed.prefix.column_count as usize;

    let names_size = character::encoded_size(&mut file, parsed.names_offset, column_count as u64)
        .map_err(map_codec_error)?;
    let index_offset = parsed.names_offset + names_size;
    file.seek(SeekFrom::Start(index_offset))?;
    let mut raw_index = vec![0u8; ChunkIndex::byte_size(column_count)];
    read_exact_or_truncated(&mut file, &mut raw_index)?;
    let index = ChunkIndex::decode(&raw_index, column_count);

    if index.chunk_count > 1 {
        return Err(UnsupportedError::MultiChunk {
            chunk_count: index.chunk_count,
        }
        .into());
    }
    if index.chunk_count == 0 {
        return Err(StructuralError::Corrupt("chunk index holds no chunks".to_string()).into());
    }

    // First-match name resolution; duplicate names resolve to the first.
    let mut positions_by_name: IndexMap<&str, usize> = IndexMap::with_capacity(column_count);
    for (position, name) in parsed.column_names.iter().enumerate() {
        positions_by_name.entry(name.as_str()).or_insert(position);
    }

    let selected: Vec<usize> = match &options.columns {
        None => (0..column_count).collect(),
        Some(requested) => requested
            .iter()
            .map(|name| {
                positions_by_name
                    .get(name.as_str())
                    .copied()
                    .ok_or_else(|| DataError::ColumnNotFound(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?,
    };

    let total_rows = index.chunk_row_counts[0];
    if options.from_row == 0 {
        return Err(DataError::FromRowNotPositive.into());
    }
    let first_row = options.from_row - 1;
    if first_row >= total_rows {
        return Err(DataError::RowSelectionOutOfRange.into());
    }
    let mut length = total_rows - first_row;
    if let Some(to_row) = options.to_row {
        if to_row <= first_row {
            return Err(DataError::IncorrectRowRange.into());
        }
        length = length.min(to_row - first_row);
    }

    tracing::debug!(
        "Reading rows {}..{} of {} from {} ({} of {} columns)",
        first_row + 1,
        first_row + length,
        total_rows,
        path.display(),
        selected.len(),
        column_count
    );

    let mut fields = Vec::with_capacity(selected.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(selected.len());
    for &position in &selected {
        let tag = parsed.body.column_types[position];
        let column_type =
            ColumnType::from_tag(tag).ok_or(SchemaError::UnknownColumnType(tag))?;
        let offset = index.column_offsets[position];
        let array: ArrayRef = match column_type {
            ColumnType::Character => Arc::new(
                character::read_string_column(&mut file, offset, first_row, length, total_rows)
                    .map_err(map_codec_error)?,
            ),
            ColumnType::Factor => Arc::new(
                factor::read_factor_column(&mut file, offset, first_row, length, total_rows)
                    .map_err(map_codec_error)?,
            ),
            ColumnType::Int32 => Arc::new(
                integer::read_int32_column(&mut file, offset, first_row, length, total_rows)
                    .map_err(map_codec_error)?,
            ),
            ColumnType::Double => Arc::new(
                double::read_double_column(&mut file, offset, first_row, length, total_rows)
                    .map_err(map_codec_error)?,
            ),
            ColumnType::Logical => Arc::new(
                logical::read_logical_column(&mut file, offset, first_row, length, total_rows)
                    .map_err(map_codec_error)?,
            ),
        };
        fields.push(Field::new(
            &parsed.column_names[position],
            column_type.to_arrow(),
            false,
        ));
        arrays.push(array);
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new_with_options(
        schema,
        arrays,
        &RecordBatchOptions::new().with_row_count(Some(length as usize)),
    )?;

    // Keys survive projection only as an unbroken prefix: once one key
    // column is missing from the selection, the sort guarantee of the
    // remaining keys is void and they are not reported.
    let mut key_index = Vec::new();
    for &key_position in &parsed.body.key_positions {
        match selected
            .iter()
            .position(|&position| position == key_position as usize)
        {
            Some(result_position) => key_index.push(result_position),
            None => break,
        }
    }

    Ok(ReadResult { batch, key_index })
}
