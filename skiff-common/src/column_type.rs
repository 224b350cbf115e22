use arrow::datatypes::DataType;
use serde::{Deserialize, Serialize};

/// On-disk representation of a column, one variant per supported codec.
///
/// The discriminants are the `u16` type tags written into the chunkset
/// header. They are part of the file format and must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum ColumnType {
    /// Variable-width UTF-8 strings.
    Character = 6,
    /// Dictionary-encoded strings: a level table plus 32-bit codes.
    Factor = 7,
    /// 32-bit signed integers.
    Int32 = 8,
    /// 64-bit IEEE-754 floating point values.
    Double = 9,
    /// Booleans, stored as 32-bit words.
    Logical = 10,
}

/// Logical classification of a column independent of its on-disk
/// representation.
///
/// Recorded next to the representation tag so that a future format version
/// can introduce an alternative encoding of the same logical type without
/// breaking readers that only care about the logical type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum BaseColumnType {
    Character = 1,
    Factor = 2,
    Integer = 3,
    Floating = 4,
    Logical = 5,
}

impl ColumnType {
    /// The on-disk `u16` tag for this column type.
    pub fn tag(self) -> u16 {
        self as u16
    }

    /// Resolve an on-disk tag back to a column type. Unknown tags return
    /// `None`; callers decide whether that is a schema error or a
    /// forward-compatibility case.
    pub fn from_tag(tag: u16) -> Option<Self> {
        match tag {
            6 => Some(Self::Character),
            7 => Some(Self::Factor),
            8 => Some(Self::Int32),
            9 => Some(Self::Double),
            10 => Some(Self::Logical),
            _ => None,
        }
    }

    /// The coarse logical classification for this representation.
    pub fn base_type(self) -> BaseColumnType {
        match self {
            Self::Character => BaseColumnType::Character,
            Self::Factor => BaseColumnType::Factor,
            Self::Int32 => BaseColumnType::Integer,
            Self::Double => BaseColumnType::Floating,
            Self::Logical => BaseColumnType::Logical,
        }
    }

    /// Map an Arrow data type onto a supported column type, if any.
    pub fn from_arrow(data_type: &DataType) -> Option<Self> {
        match data_type {
            DataType::Utf8 => Some(Self::Character),
            DataType::Dictionary(key, value)
                if key.as_ref() == &DataType::Int32 && value.as_ref() == &DataType::Utf8 =>
            {
                Some(Self::Factor)
            }
            DataType::Int32 => Some(Self::Int32),
            DataType::Float64 => Some(Self::Double),
            DataType::Boolean => Some(Self::Logical),
            _ => None,
        }
    }

    /// The Arrow data type a decoded column of this type materializes as.
    pub fn to_arrow(self) -> DataType {
        match self {
            Self::Character => DataType::Utf8,
            Self::Factor => DataType::Dictionary(
                Box::new(DataType::Int32),
                Box::new(DataType::Utf8),
            ),
            Self::Int32 => DataType::Int32,
            Self::Double => DataType::Float64,
            Self::Logical => DataType::Boolean,
        }
    }
}

impl BaseColumnType {
    /// The on-disk `u16` tag for this base type.
    pub fn tag(self) -> u16 {
        self as u16
    }

    pub fn from_tag(tag: u16) -> Option<Self> {
        match tag {
            1 => Some(Self::Character),
            2 => Some(Self::Factor),
            3 => Some(Self::Integer),
            4 => Some(Self::Floating),
            5 => Some(Self::Logical),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for column_type in [
            ColumnType::Character,
            ColumnType::Factor,
            ColumnType::Int32,
            ColumnType::Double,
            ColumnType::Logical,
        ] {
            assert_eq!(ColumnType::from_tag(column_type.tag()), Some(column_type));
            assert_eq!(
                BaseColumnType::from_tag(column_type.base_type().tag()),
                Some(column_type.base_type())
            );
        }
        assert_eq!(ColumnType::from_tag(11), None);
        assert_eq!(ColumnType::from_tag(0), None);
    }

    #[test]
    fn arrow_mapping_round_trips() {
        for column_type in [
            ColumnType::Character,
            ColumnType::Factor,
            ColumnType::Int32,
            ColumnType::Double,
            ColumnType::Logical,
        ] {
            assert_eq!(
                ColumnType::from_arrow(&column_type.to_arrow()),
                Some(column_type)
            );
        }
        assert_eq!(ColumnType::from_arrow(&DataType::Int64), None);
    }
}
