//! Shared data model for the skiff columnar store.
//!
//! This crate hosts the pieces that both the codec layer and the store
//! orchestration layer need to agree on: the closed set of supported column
//! types with their on-disk tags, the coarser base-type classification kept
//! for forward compatibility, and the [`Dataset`](dataset::Dataset) wrapper
//! that binds an Arrow `RecordBatch` to its declared key columns.

pub mod column_type;
pub mod dataset;

pub use column_type::{BaseColumnType, ColumnType};
pub use dataset::{Dataset, DatasetError};
