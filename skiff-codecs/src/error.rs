use arrow::error::ArrowError;

pub type CodecResult<T> = std::result::Result<T, CodecError>;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("I/O error in column data: {0}")]
    Io(#[from] std::io::Error),
    #[error("column data is corrupt: {0}")]
    Corrupt(String),
    #[error("unknown compression algorithm tag {0} in column data")]
    UnknownAlgorithm(u16),
    #[error("failed to decompress column block: {0}")]
    Decompress(String),
    #[error("column data is not valid UTF-8")]
    InvalidUtf8,
    #[error("failed to assemble column array: {0}")]
    Arrow(#[from] ArrowError),
}
