//! Per-column-type codecs for the skiff columnar store.
//!
//! Each supported column type owns one codec module that fully defines that
//! column's byte stream: its sub-header, its compression framing, and how a
//! row range is located without decoding the rest of the column. The store
//! layer treats every codec as opaque beyond two operations: write a whole
//! column (returning the bytes written) and read a row range given the
//! column's byte offset, the first row, the row count, and the total rows
//! stored.
//!
//! Compression is uniform across codecs: a 0-100 level maps to stored
//! (0), LZ4 (1-50) or Zstandard (51-100), and compressed columns are cut
//! into fixed-size row blocks with a block directory so partial reads only
//! decompress the blocks covering the requested rows. Individual codecs may
//! clamp the level; the algorithm actually used is recorded in the column's
//! sub-header, never re-derived from the level.

mod blocks;

pub mod character;
pub mod compression;
pub mod double;
pub mod error;
pub mod factor;
pub mod integer;
pub mod logical;

pub use error::{CodecError, CodecResult};
