//! Core data model types.
//!
//! Loaders produce a [`Table`] of natively typed [`Column`]s. The resolver turns each column into
//! a [`ResolvedColumn`]: a [`ColumnDescriptor`] (name, [`ColumnKind`], width) plus the column's
//! values normalized to [`ColumnValues`]. Descriptors define the on-disk field order.

use std::collections::HashSet;
use std::fmt;

use crate::error::{ConvertError, ConvertResult};

/// Native element type of a loaded column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    /// 8-bit signed integer.
    Int8,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 8-bit unsigned integer.
    UInt8,
    /// 16-bit unsigned integer.
    UInt16,
    /// 32-bit unsigned integer.
    UInt32,
    /// 64-bit unsigned integer.
    UInt64,
    /// 32-bit float.
    Float32,
    /// 64-bit float.
    Float64,
    /// UTF-8 text.
    Utf8,
    /// Boolean.
    Bool,
    /// Any other source type, identified by its raw tag.
    Other(String),
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            DataType::Int8 => "int8",
            DataType::Int16 => "int16",
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::UInt8 => "uint8",
            DataType::UInt16 => "uint16",
            DataType::UInt32 => "uint32",
            DataType::UInt64 => "uint64",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::Utf8 => "utf8",
            DataType::Bool => "bool",
            DataType::Other(tag) => tag.as_str(),
        };
        f.write_str(tag)
    }
}

/// Column-major storage for one loaded column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Utf8(Vec<String>),
    Bool(Vec<bool>),
    /// Values of a type the loaders cannot represent; only the row count is kept.
    Unsupported { type_tag: String, len: usize },
}

impl ColumnData {
    /// Number of values in the column.
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int8(v) => v.len(),
            ColumnData::Int16(v) => v.len(),
            ColumnData::Int32(v) => v.len(),
            ColumnData::Int64(v) => v.len(),
            ColumnData::UInt8(v) => v.len(),
            ColumnData::UInt16(v) => v.len(),
            ColumnData::UInt32(v) => v.len(),
            ColumnData::UInt64(v) => v.len(),
            ColumnData::Float32(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
            ColumnData::Utf8(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
            ColumnData::Unsupported { len, .. } => *len,
        }
    }

    /// Returns `true` if the column holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Native element type tag of the column.
    pub fn data_type(&self) -> DataType {
        match self {
            ColumnData::Int8(_) => DataType::Int8,
            ColumnData::Int16(_) => DataType::Int16,
            ColumnData::Int32(_) => DataType::Int32,
            ColumnData::Int64(_) => DataType::Int64,
            ColumnData::UInt8(_) => DataType::UInt8,
            ColumnData::UInt16(_) => DataType::UInt16,
            ColumnData::UInt32(_) => DataType::UInt32,
            ColumnData::UInt64(_) => DataType::UInt64,
            ColumnData::Float32(_) => DataType::Float32,
            ColumnData::Float64(_) => DataType::Float64,
            ColumnData::Utf8(_) => DataType::Utf8,
            ColumnData::Bool(_) => DataType::Bool,
            ColumnData::Unsupported { type_tag, .. } => DataType::Other(type_tag.clone()),
        }
    }

    /// Render the value at `row` for display, or `None` if `row` is out of range.
    ///
    /// Values of an unsupported type render as `?`.
    pub fn display_value(&self, row: usize) -> Option<String> {
        fn cell<T: ToString>(v: &[T], row: usize) -> Option<String> {
            v.get(row).map(ToString::to_string)
        }
        match self {
            ColumnData::Int8(v) => cell(v, row),
            ColumnData::Int16(v) => cell(v, row),
            ColumnData::Int32(v) => cell(v, row),
            ColumnData::Int64(v) => cell(v, row),
            ColumnData::UInt8(v) => cell(v, row),
            ColumnData::UInt16(v) => cell(v, row),
            ColumnData::UInt32(v) => cell(v, row),
            ColumnData::UInt64(v) => cell(v, row),
            ColumnData::Float32(v) => cell(v, row),
            ColumnData::Float64(v) => cell(v, row),
            ColumnData::Utf8(v) => cell(v, row),
            ColumnData::Bool(v) => cell(v, row),
            ColumnData::Unsupported { len, .. } => (row < *len).then(|| "?".to_string()),
        }
    }
}

/// A single named column of a [`Table`].
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Column values.
    pub data: ColumnData,
}

impl Column {
    /// Create a new column.
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// In-memory tabular dataset with no missing values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// Ordered columns.
    pub columns: Vec<Column>,
}

impl Table {
    /// Create a table from columns.
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Number of rows (the length of the first column, or zero for a table without columns).
    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.data.len()).unwrap_or(0)
    }

    /// Iterate column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Returns the index of a column by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Plain-text preview of the first `n` rows: a header line of column names, then one line per
    /// row, every column right-aligned to its widest cell.
    pub fn head(&self, n: usize) -> String {
        let rows = self.row_count().min(n);
        let cells: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|c| {
                std::iter::once(c.name.clone())
                    .chain((0..rows).map(|r| c.data.display_value(r).unwrap_or_default()))
                    .collect()
            })
            .collect();
        let widths: Vec<usize> = cells
            .iter()
            .map(|col| col.iter().map(|s| s.chars().count()).max().unwrap_or(0))
            .collect();

        let mut out = String::new();
        for line in 0..=rows {
            let fields: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(col, &w)| format!("{:>w$}", col[line]))
                .collect();
            out.push_str(fields.join("  ").trim_end());
            out.push('\n');
        }
        out
    }

    /// Check that the table has at least one column, unique names and equal column lengths.
    pub fn validate(&self) -> ConvertResult<()> {
        if self.columns.is_empty() {
            return Err(ConvertError::InvalidTable {
                message: "table has no columns".to_string(),
            });
        }

        let rows = self.row_count();
        let mut seen = HashSet::with_capacity(self.columns.len());
        for col in &self.columns {
            if col.name.is_empty() {
                return Err(ConvertError::InvalidTable {
                    message: "column name is empty".to_string(),
                });
            }
            if !seen.insert(col.name.as_str()) {
                return Err(ConvertError::InvalidTable {
                    message: format!("duplicate column name '{}'", col.name),
                });
            }
            if col.data.len() != rows {
                return Err(ConvertError::InvalidTable {
                    message: format!(
                        "column '{}' has {} values, expected {rows}",
                        col.name,
                        col.data.len()
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Storage class of a field in the binary record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Signed two's-complement integer.
    Integer,
    /// IEEE 754 float.
    Float,
    /// Fixed-length, zero-padded byte string.
    Character,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Character => "character",
        })
    }
}

/// A `(kind, width)` pair: the type of one binary field.
///
/// Displays as the token accepted by format override files (`int32`, `float64`, `S12`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldType {
    pub kind: ColumnKind,
    /// Byte width for numeric kinds; string length for [`ColumnKind::Character`].
    pub width: usize,
}

impl FieldType {
    pub fn integer(width: usize) -> Self {
        Self {
            kind: ColumnKind::Integer,
            width,
        }
    }

    pub fn float(width: usize) -> Self {
        Self {
            kind: ColumnKind::Float,
            width,
        }
    }

    pub fn character(width: usize) -> Self {
        Self {
            kind: ColumnKind::Character,
            width,
        }
    }

    /// Integer and float fields are numeric; character fields are not.
    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, ColumnKind::Integer | ColumnKind::Float)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ColumnKind::Integer => write!(f, "int{}", self.width * 8),
            ColumnKind::Float => write!(f, "float{}", self.width * 8),
            ColumnKind::Character => write!(f, "S{}", self.width),
        }
    }
}

/// The resolved name and binary type of one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Column name, unique within the table.
    pub name: String,
    /// Storage class.
    pub kind: ColumnKind,
    /// Byte width (numeric) or fixed string length (character).
    pub width: usize,
}

impl ColumnDescriptor {
    /// Create a descriptor from a name and field type.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            kind: field_type.kind,
            width: field_type.width,
        }
    }

    /// The descriptor's `(kind, width)` pair.
    pub fn field_type(&self) -> FieldType {
        FieldType {
            kind: self.kind,
            width: self.width,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.field_type().is_numeric()
    }
}

/// Column values normalized to the widest representation of their kind.
///
/// Narrower source types are widened losslessly (`i8` → `i64`, `f32` → `f64`); the descriptor's
/// width decides how they are encoded.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Integer(Vec<i64>),
    Float(Vec<f64>),
    Text(Vec<String>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Integer(v) => v.len(),
            ColumnValues::Float(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The [`ColumnKind`] these values can be encoded as.
    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnValues::Integer(_) => ColumnKind::Integer,
            ColumnValues::Float(_) => ColumnKind::Float,
            ColumnValues::Text(_) => ColumnKind::Character,
        }
    }
}

/// A column after type resolution: its descriptor plus values matching the descriptor's kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedColumn {
    pub descriptor: ColumnDescriptor,
    pub values: ColumnValues,
}

/// Non-fatal conditions observed during a conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionWarning {
    /// A format override was not applied; the column keeps its previous type.
    OverrideRejected {
        column: String,
        requested: FieldType,
        reason: String,
    },
    /// Text values longer than the column width were truncated during serialization.
    TextTruncated {
        column: String,
        width: usize,
        count: usize,
    },
}

impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionWarning::OverrideRejected {
                column,
                requested,
                reason,
            } => write!(
                f,
                "column '{column}' not converted to {requested}: {reason}"
            ),
            ConversionWarning::TextTruncated {
                column,
                width,
                count,
            } => write!(
                f,
                "column '{column}': {count} value(s) truncated to {width} bytes"
            ),
        }
    }
}
