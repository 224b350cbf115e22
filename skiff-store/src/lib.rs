//! Single-file columnar table store.
//!
//! This crate is the file-format orchestration layer: it lays out a table
//! (named, typed columns of equal row count) into one binary file and reads
//! it back fully or partially — row-range slices and column subsets —
//! without decoding anything that was not asked for. The per-type column
//! codecs live in `skiff-codecs`; the shared data model in `skiff-common`.
//!
//! Format overview
//!
//! ```text
//! ┌─────────────────────────────┐
//! │ TableHeader        24 bytes │  magic, version, table class,
//! │                             │  key count, column count
//! ├─────────────────────────────┤
//! │ key positions   4·keys B    │
//! ├─────────────────────────────┤
//! │ ChunksetHeader     32 bytes │  reserved chunkset links, row count,
//! │                             │  version, column count
//! ├─────────────────────────────┤
//! │ column tags     6·cols B    │  reserved attrs, type tags, base tags
//! ├─────────────────────────────┤
//! │ column name block           │  string codec, never compressed
//! ├─────────────────────────────┤
//! │ ChunkIndex        144 bytes │  8 chunk slots (slot 0 in use),
//! │                             │  chunk bookkeeping
//! ├─────────────────────────────┤
//! │ column offsets  8·cols B    │  one byte offset per column payload
//! ├─────────────────────────────┤
//! │ column payloads             │  codec-owned streams, in order
//! └─────────────────────────────┘
//! ```
//!
//! Writing reserves the index region and backpatches it (and the header)
//! once every column payload's offset is known. Reading validates identity
//! and version from a fixed-size prefix before trusting anything else, and
//! a metadata-only read never touches the chunk index or a column payload.

pub mod error;
pub mod layout;
pub mod reader;
pub mod writer;

pub use error::{
    DataError, SchemaError, SkiffResult, StoreError, StructuralError, UnsupportedError,
};
pub use reader::{read_dataset, read_metadata, ReadOptions, ReadResult, StoreMetadata};
pub use writer::{write_dataset, WriteOptions};
