//! Write path: serialize a [`Dataset`] into a single store file.
//!
//! The writer cannot know column byte offsets in advance (encoded sizes
//! depend on compression), so it reserves space instead: header and name
//! block first, then a placeholder chunk index, then every column payload
//! in declaration order while recording each payload's start offset, and
//! finally a seek back to rewrite the header and the now-populated index.
//! Column payload writing stays fully streaming and no total size is ever
//! precomputed.

use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use arrow::array::{Array, AsArray, StringArray};
use arrow::datatypes::{Float64Type, Int32Type};
use serde::{Deserialize, Serialize};
use skiff_common::{ColumnType, Dataset};
use skiff_codecs::compression::LEVEL_MAX;
use skiff_codecs::{character, double, factor, integer, logical};

use crate::error::{DataError, SchemaError, SkiffResult};
use crate::layout::{ChunkIndex, FileHeader, CHUNK_INDEX_SIZE};

/// Options for writing a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteOptions {
    /// Uniform compression level, 0-100, passed to every column codec.
    /// Individual codecs may clamp it.
    pub compression_level: u8,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compression_level: 50,
        }
    }
}

/// Serialize `dataset` into a new store file at `path`.
///
/// The destination is created (or truncated) only after every schema
/// precondition has been checked, so a partially written file can only be
/// left behind by an I/O failure mid-write. There is no atomic
/// replace-on-success.
pub fn write_dataset(
    path: impl AsRef<Path>,
    dataset: &Dataset,
    options: &WriteOptions,
) -> SkiffResult<()> {
    let path = path.as_ref();
    let column_count = dataset.column_count();
    let row_count = dataset.row_count() as u64;
    let level = options.compression_level;

    if column_count == 0 {
        return Err(SchemaError::NoColumns.into());
    }
    if row_count == 0 {
        return Err(DataError::NoRows.into());
    }
    if level > LEVEL_MAX {
        return Err(DataError::InvalidCompressionLevel(level).into());
    }

    let mut column_types = Vec::with_capacity(column_count);
    for position in 0..column_count {
        let name = dataset.column_name(position);
        let column_type =
            dataset
                .column_type(position)
                .ok_or_else(|| SchemaError::UnsupportedDataType {
                    name: name.to_string(),
                    data_type: dataset.column(position).data_type().clone(),
                })?;
        let column = dataset.column(position);
        let mut null_count = column.null_count();
        if column_type == ColumnType::Factor {
            null_count += column.as_dictionary::<Int32Type>().values().null_count();
        }
        if null_count > 0 {
            return Err(SchemaError::NullValues(name.to_string()).into());
        }
        column_types.push(column_type);
    }

    tracing::debug!(
        "Writing dataset with {} columns and {} rows to {} at compression level {}",
        column_count,
        row_count,
        path.display(),
        level
    );

    let header = FileHeader::new(dataset.key_positions().to_vec(), &column_types, row_count);
    let header_bytes = header.encode();

    let mut out = BufWriter::new(File::create(path)?);
    out.write_all(&header_bytes)?;

    // Column names go through the string codec with the level forced to
    // zero: the name block must stay readable before anything else about
    // the file is known.
    let names = StringArray::from_iter_values(
        (0..column_count).map(|position| dataset.column_name(position)),
    );
    character::write_string_column(&mut out, &names, 0)?;

    let mut index = ChunkIndex::placeholder(row_count, column_count);
    out.write_all(&index.encode())?;

    for (position, &column_type) in column_types.iter().enumerate() {
        index.column_offsets[position] = out.stream_position()?;
        let column = dataset.column(position);
        match column_type {
            ColumnType::Character => {
                character::write_string_column(&mut out, column.as_string::<i32>(), level)?
            }
            ColumnType::Factor => {
                factor::write_factor_column(&mut out, column.as_dictionary::<Int32Type>(), level)?
            }
            ColumnType::Int32 => {
                integer::write_int32_column(&mut out, column.as_primitive::<Int32Type>(), level)?
            }
            ColumnType::Double => {
                double::write_double_column(&mut out, column.as_primitive::<Float64Type>(), level)?
            }
            ColumnType::Logical => {
                logical::write_logical_column(&mut out, column.as_boolean(), level)?
            }
        };
    }

    // Backpatch: the chunk's own start position is the offset table's
    // start, and the index block sits immediately before it.
    index.chunk_offsets[0] = index.column_offsets[0] - 8 * column_count as u64;
    out.seek(SeekFrom::Start(0))?;
    out.write_all(&header_bytes)?;
    out.seek(SeekFrom::Start(index.chunk_offsets[0] - CHUNK_INDEX_SIZE as u64))?;
    out.write_all(&index.encode())?;
    out.flush()?;

    tracing::debug!("Finished writing {}", path.display());
    Ok(())
}
