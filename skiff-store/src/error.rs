use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use skiff_codecs::CodecError;

pub type SkiffResult<T> = std::result::Result<T, StoreError>;

/// Top-level error for store operations. Every failure aborts the current
/// call with no partial result; all buffers are call-local and released by
/// scope on every exit path.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Structural(#[from] StructuralError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Unsupported(#[from] UnsupportedError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("column codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

/// The file itself cannot be interpreted: wrong identity, truncation, or a
/// version from the future.
#[derive(Debug, thiserror::Error)]
pub enum StructuralError {
    /// The magic constant does not match. Kept distinct from corruption so
    /// a caller may route the path to a separate legacy-format reader.
    #[error("not a recognized skiff store file")]
    UnrecognizedFile,
    #[error(
        "incompatible store file: written by format version {found}, this build reads up to {supported}"
    )]
    IncompatibleVersion { found: u32, supported: u32 },
    #[error("store file is incomplete or damaged")]
    Truncated,
    #[error("store file is corrupt: {0}")]
    Corrupt(String),
}

/// The file parses but its schema, or the dataset being written, is not
/// representable.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("dataset needs at least one column")]
    NoColumns,
    #[error("column '{name}' has unsupported data type {data_type}")]
    UnsupportedDataType { name: String, data_type: DataType },
    #[error("unknown column type tag {0} in store file")]
    UnknownColumnType(u16),
    #[error("unknown base type tag {0} in store file")]
    UnknownBaseType(u16),
    #[error("column '{0}' contains null values, which the store cannot represent")]
    NullValues(String),
}

/// The request addresses data the file does not have.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("the dataset contains no data")]
    NoRows,
    #[error("parameter from_row should have a positive value")]
    FromRowNotPositive,
    #[error("row selection is out of range")]
    RowSelectionOutOfRange,
    #[error("incorrect row range specified")]
    IncorrectRowRange,
    #[error("selected column not found: '{0}'")]
    ColumnNotFound(String),
    #[error("compression level should be a value between 0 and 100, got {0}")]
    InvalidCompressionLevel(u8),
}

/// Layout features that are reserved in the format but deliberately not
/// implemented by this reader.
#[derive(Debug, thiserror::Error)]
pub enum UnsupportedError {
    #[error("store file holds {chunk_count} row chunks; multi-chunk reads are not supported")]
    MultiChunk { chunk_count: u64 },
}
