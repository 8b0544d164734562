//! Column type resolution: native element types → binary field descriptors.

use crate::error::{ConvertError, ConvertResult};
use crate::types::{Column, ColumnData, ColumnDescriptor, ColumnValues, FieldType, ResolvedColumn, Table};

/// Resolve every column of `table`, in order.
///
/// The table is validated first; the first column with an unsupported type aborts resolution.
pub fn resolve_table(table: &Table) -> ConvertResult<Vec<ResolvedColumn>> {
    table.validate()?;
    table.columns.iter().map(resolve_column).collect()
}

/// Resolve one column.
///
/// - Signed integers and floats keep their width.
/// - Text becomes a character field as wide as the longest value (in bytes), and at least 1.
/// - Anything else fails with [`ConvertError::UnsupportedType`].
pub fn resolve_column(column: &Column) -> ConvertResult<ResolvedColumn> {
    let (field_type, values) = match &column.data {
        ColumnData::Int8(v) => (FieldType::integer(1), widen_ints(v)),
        ColumnData::Int16(v) => (FieldType::integer(2), widen_ints(v)),
        ColumnData::Int32(v) => (FieldType::integer(4), widen_ints(v)),
        ColumnData::Int64(v) => (FieldType::integer(8), ColumnValues::Integer(v.clone())),
        ColumnData::Float32(v) => (
            FieldType::float(4),
            ColumnValues::Float(v.iter().map(|&x| f64::from(x)).collect()),
        ),
        ColumnData::Float64(v) => (FieldType::float(8), ColumnValues::Float(v.clone())),
        ColumnData::Utf8(v) => {
            let longest = v.iter().map(|s| s.len()).max().unwrap_or(0);
            (
                FieldType::character(longest.max(1)),
                ColumnValues::Text(v.clone()),
            )
        }
        other => {
            return Err(ConvertError::UnsupportedType {
                column: column.name.clone(),
                type_tag: other.data_type().to_string(),
            });
        }
    };

    Ok(ResolvedColumn {
        descriptor: ColumnDescriptor::new(column.name.clone(), field_type),
        values,
    })
}

fn widen_ints<T: Copy + Into<i64>>(values: &[T]) -> ColumnValues {
    ColumnValues::Integer(values.iter().map(|&x| x.into()).collect())
}
