use arrow::array::{ArrayRef, RecordBatch};

use crate::column_type::ColumnType;

/// A table handed to the store for writing: an Arrow `RecordBatch` plus the
/// positions of the columns that make up its sort key, in key order.
///
/// The key declaration is carried through column projection on read so a
/// result can report whether its sort guarantee still holds.
#[derive(Debug, Clone)]
pub struct Dataset {
    batch: RecordBatch,
    key_positions: Vec<u32>,
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("key column position {position} is out of range for a table with {columns} columns")]
    KeyOutOfRange { position: u32, columns: usize },
    #[error("key column position {0} is declared more than once")]
    DuplicateKey(u32),
}

impl Dataset {
    /// Wrap a batch with no key columns.
    pub fn new(batch: RecordBatch) -> Self {
        Self {
            batch,
            key_positions: Vec::new(),
        }
    }

    /// Wrap a batch with the given key column positions (in key order).
    pub fn with_keys(batch: RecordBatch, key_positions: Vec<u32>) -> Result<Self, DatasetError> {
        let columns = batch.num_columns();
        for (i, &position) in key_positions.iter().enumerate() {
            if position as usize >= columns {
                return Err(DatasetError::KeyOutOfRange { position, columns });
            }
            if key_positions[..i].contains(&position) {
                return Err(DatasetError::DuplicateKey(position));
            }
        }
        Ok(Self {
            batch,
            key_positions,
        })
    }

    pub fn column_count(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn row_count(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn key_count(&self) -> usize {
        self.key_positions.len()
    }

    pub fn key_positions(&self) -> &[u32] {
        &self.key_positions
    }

    pub fn column_name(&self, index: usize) -> &str {
        self.batch.schema_ref().field(index).name()
    }

    /// The store column type of a column, or `None` for an Arrow type the
    /// format has no codec for.
    pub fn column_type(&self, index: usize) -> Option<ColumnType> {
        ColumnType::from_arrow(self.batch.schema_ref().field(index).data_type())
    }

    pub fn column(&self, index: usize) -> &ArrayRef {
        self.batch.column(index)
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::Int32Array;
    use arrow::datatypes::{DataType, Field, Schema};

    use super::*;

    fn two_column_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("a", DataType::Int32, false),
            Field::new("b", DataType::Int32, false),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int32Array::from(vec![1, 2])),
                Arc::new(Int32Array::from(vec![3, 4])),
            ],
        )
        .expect("batch")
    }

    #[test]
    fn key_positions_are_validated() {
        let dataset = Dataset::with_keys(two_column_batch(), vec![1, 0]).expect("valid keys");
        assert_eq!(dataset.key_positions(), &[1, 0]);
        assert_eq!(dataset.key_count(), 2);

        assert!(matches!(
            Dataset::with_keys(two_column_batch(), vec![2]),
            Err(DatasetError::KeyOutOfRange { position: 2, .. })
        ));
        assert!(matches!(
            Dataset::with_keys(two_column_batch(), vec![0, 0]),
            Err(DatasetError::DuplicateKey(0))
        ));
    }

    #[test]
    fn column_accessors() {
        let dataset = Dataset::new(two_column_batch());
        assert_eq!(dataset.column_count(), 2);
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.key_count(), 0);
        assert_eq!(dataset.column_name(1), "b");
        assert_eq!(dataset.column_type(0), Some(ColumnType::Int32));
    }
}
