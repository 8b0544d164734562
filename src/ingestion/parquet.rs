//! Parquet loading.

use std::path::Path;

use parquet::basic::{ConvertedType, Repetition, Type as PhysicalType};
use parquet::file::reader::FileReader;
use parquet::file::serialized_reader::SerializedFileReader;
use parquet::record::Field;
use parquet::schema::types::Type as SchemaType;

use crate::error::{ConvertError, ConvertResult};
use crate::types::{Column, ColumnData, Table};

/// Load a Parquet file into a [`Table`].
///
/// Notes:
/// - Each top-level field becomes one column; its native type comes from the physical and
///   converted type in the file schema (`INT32 (INT_16)` → `Int16`, `BYTE_ARRAY (UTF8)` → `Utf8`).
/// - Nested, repeated and otherwise unmapped fields are kept as [`ColumnData::Unsupported`] and
///   rejected later by type resolution.
/// - Nulls become zero (numeric), `false` (boolean) or empty text.
/// - Uses the Parquet record API (`RowIter`).
pub fn load_parquet_from_path(path: impl AsRef<Path>) -> ConvertResult<Table> {
    let reader = SerializedFileReader::try_from(path.as_ref())?;

    let schema = reader.metadata().file_metadata().schema_descr_ptr();
    let mut columns: Vec<Column> = schema
        .root_schema()
        .get_fields()
        .iter()
        .map(|field| Column::new(field.name(), empty_column_for(field)))
        .collect();

    for (idx0, row_res) in reader.into_iter().enumerate() {
        let row_num = idx0 + 1;
        let row = row_res?;
        for (col, (_, field)) in columns.iter_mut().zip(row.get_column_iter()) {
            push_field(&mut col.data, field).map_err(|message| ConvertError::InvalidTable {
                message: format!("row {row_num} column '{}': {message}", col.name),
            })?;
        }
    }

    Ok(Table::new(columns))
}

/// Empty storage for a top-level schema field.
fn empty_column_for(field: &SchemaType) -> ColumnData {
    let unsupported = |type_tag: String| ColumnData::Unsupported { type_tag, len: 0 };

    if !field.is_primitive() {
        return unsupported("group".to_string());
    }
    let info = field.get_basic_info();
    if info.has_repetition() && info.repetition() == Repetition::REPEATED {
        return unsupported("repeated".to_string());
    }

    let physical = field.get_physical_type();
    let converted = info.converted_type();
    match (physical, converted) {
        (PhysicalType::BOOLEAN, _) => ColumnData::Bool(Vec::new()),
        (PhysicalType::INT32, ConvertedType::NONE | ConvertedType::INT_32) => ColumnData::Int32(Vec::new()),
        (PhysicalType::INT32, ConvertedType::INT_8) => ColumnData::Int8(Vec::new()),
        (PhysicalType::INT32, ConvertedType::INT_16) => ColumnData::Int16(Vec::new()),
        (PhysicalType::INT32, ConvertedType::UINT_8) => ColumnData::UInt8(Vec::new()),
        (PhysicalType::INT32, ConvertedType::UINT_16) => ColumnData::UInt16(Vec::new()),
        (PhysicalType::INT32, ConvertedType::UINT_32) => ColumnData::UInt32(Vec::new()),
        (PhysicalType::INT64, ConvertedType::NONE | ConvertedType::INT_64) => ColumnData::Int64(Vec::new()),
        (PhysicalType::INT64, ConvertedType::UINT_64) => ColumnData::UInt64(Vec::new()),
        (PhysicalType::FLOAT, _) => ColumnData::Float32(Vec::new()),
        (PhysicalType::DOUBLE, _) => ColumnData::Float64(Vec::new()),
        (PhysicalType::BYTE_ARRAY, ConvertedType::UTF8 | ConvertedType::ENUM | ConvertedType::JSON) => {
            ColumnData::Utf8(Vec::new())
        }
        (physical, ConvertedType::NONE) => unsupported(physical.to_string()),
        (physical, converted) => unsupported(format!("{physical} ({converted})")),
    }
}

/// Append one record-API value to a column.
fn push_field(data: &mut ColumnData, field: &Field) -> Result<(), String> {
    match (data, field) {
        (ColumnData::Unsupported { len, .. }, _) => *len += 1,

        (ColumnData::Bool(v), Field::Bool(x)) => v.push(*x),
        (ColumnData::Bool(v), Field::Null) => v.push(false),

        (ColumnData::Int8(v), Field::Byte(x)) => v.push(*x),
        (ColumnData::Int8(v), Field::Null) => v.push(0),
        (ColumnData::Int16(v), Field::Short(x)) => v.push(*x),
        (ColumnData::Int16(v), Field::Null) => v.push(0),
        (ColumnData::Int32(v), Field::Int(x)) => v.push(*x),
        (ColumnData::Int32(v), Field::Null) => v.push(0),
        (ColumnData::Int64(v), Field::Long(x)) => v.push(*x),
        (ColumnData::Int64(v), Field::Null) => v.push(0),

        (ColumnData::UInt8(v), Field::UByte(x)) => v.push(*x),
        (ColumnData::UInt8(v), Field::Null) => v.push(0),
        (ColumnData::UInt16(v), Field::UShort(x)) => v.push(*x),
        (ColumnData::UInt16(v), Field::Null) => v.push(0),
        (ColumnData::UInt32(v), Field::UInt(x)) => v.push(*x),
        (ColumnData::UInt32(v), Field::Null) => v.push(0),
        (ColumnData::UInt64(v), Field::ULong(x)) => v.push(*x),
        (ColumnData::UInt64(v), Field::Null) => v.push(0),

        (ColumnData::Float32(v), Field::Float(x)) => v.push(*x),
        (ColumnData::Float32(v), Field::Null) => v.push(0.0),
        (ColumnData::Float64(v), Field::Double(x)) => v.push(*x),
        (ColumnData::Float64(v), Field::Null) => v.push(0.0),

        (ColumnData::Utf8(v), Field::Str(s)) => v.push(s.clone()),
        (ColumnData::Utf8(v), Field::Null) => v.push(String::new()),

        (data, other) => {
            return Err(format!(
                "unexpected value {other} for a {} column",
                data.data_type()
            ));
        }
    }
    Ok(())
}
