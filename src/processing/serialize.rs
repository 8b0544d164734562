//! Packed binary record layout and serializer.
//!
//! A record is the tight concatenation of every field in descriptor order, with no padding.
//! Numbers are encoded at their field width in native byte order; text is right-padded with zero
//! bytes, or truncated when longer than the field.

use std::io::Write;

use crate::error::{ConvertError, ConvertResult};
use crate::types::{
    ColumnDescriptor, ColumnKind, ColumnValues, ConversionWarning, FieldType, ResolvedColumn,
};

/// Minimum width of the name column in the `.formats` listing.
pub const FORMATS_NAME_WIDTH: usize = 30;

/// Position of one field within a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSlot {
    pub name: String,
    pub field_type: FieldType,
    /// Byte offset from the start of the record.
    pub offset: usize,
}

/// A field value decoded from a record.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    Integer(i64),
    Float(f64),
    /// Raw field bytes, including any zero padding.
    Text(Vec<u8>),
}

/// Fixed record layout derived from an ordered list of descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    fields: Vec<FieldSlot>,
    record_size: usize,
}

impl RecordLayout {
    /// Compute offsets for `descriptors`.
    ///
    /// Integer fields may be 1, 2, 4 or 8 bytes, float fields 4 or 8, character fields any
    /// positive length. Anything else is [`ConvertError::UnsupportedWidth`].
    pub fn new(descriptors: &[ColumnDescriptor]) -> ConvertResult<Self> {
        let mut fields = Vec::with_capacity(descriptors.len());
        let mut offset = 0;
        for d in descriptors {
            let valid = match d.kind {
                ColumnKind::Integer => matches!(d.width, 1 | 2 | 4 | 8),
                ColumnKind::Float => matches!(d.width, 4 | 8),
                ColumnKind::Character => d.width > 0,
            };
            if !valid {
                return Err(ConvertError::UnsupportedWidth {
                    column: d.name.clone(),
                    kind: d.kind,
                    width: d.width,
                });
            }
            fields.push(FieldSlot {
                name: d.name.clone(),
                field_type: d.field_type(),
                offset,
            });
            offset += d.width;
        }
        Ok(Self {
            fields,
            record_size: offset,
        })
    }

    pub fn fields(&self) -> &[FieldSlot] {
        &self.fields
    }

    /// Size of one record in bytes (the sum of all field widths).
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Decode field `idx` from one record.
    ///
    /// Returns `None` if `idx` is out of range or `record` is shorter than [`Self::record_size`].
    pub fn decode_field(&self, record: &[u8], idx: usize) -> Option<DecodedValue> {
        let slot = self.fields.get(idx)?;
        let bytes = record.get(slot.offset..slot.offset + slot.field_type.width)?;
        let value = match (slot.field_type.kind, slot.field_type.width) {
            (ColumnKind::Integer, 1) => DecodedValue::Integer(i64::from(i8::from_ne_bytes(bytes.try_into().ok()?))),
            (ColumnKind::Integer, 2) => DecodedValue::Integer(i64::from(i16::from_ne_bytes(bytes.try_into().ok()?))),
            (ColumnKind::Integer, 4) => DecodedValue::Integer(i64::from(i32::from_ne_bytes(bytes.try_into().ok()?))),
            (ColumnKind::Integer, _) => DecodedValue::Integer(i64::from_ne_bytes(bytes.try_into().ok()?)),
            (ColumnKind::Float, 4) => DecodedValue::Float(f64::from(f32::from_ne_bytes(bytes.try_into().ok()?))),
            (ColumnKind::Float, _) => DecodedValue::Float(f64::from_ne_bytes(bytes.try_into().ok()?)),
            (ColumnKind::Character, _) => DecodedValue::Text(bytes.to_vec()),
        };
        Some(value)
    }
}

/// Outcome of serializing a set of columns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SerializeStats {
    /// Records written.
    pub records: usize,
    /// Bytes written.
    pub bytes: usize,
    /// One [`ConversionWarning::TextTruncated`] per column with truncated values.
    pub truncations: Vec<ConversionWarning>,
}

/// Write one packed record per row to `out`.
///
/// Output depends only on the columns: identical inputs always produce identical bytes.
pub fn write_records<W: Write>(
    out: &mut W,
    columns: &[ResolvedColumn],
) -> ConvertResult<SerializeStats> {
    let descriptors: Vec<ColumnDescriptor> = columns.iter().map(|c| c.descriptor.clone()).collect();
    let layout = RecordLayout::new(&descriptors)?;
    let rows = check_columns(columns)?;

    let mut truncated = vec![0_usize; columns.len()];
    let mut record = Vec::with_capacity(layout.record_size());
    for row in 0..rows {
        record.clear();
        for (idx, col) in columns.iter().enumerate() {
            if encode_value(&mut record, col, row)? {
                truncated[idx] += 1;
            }
        }
        out.write_all(&record)?;
    }

    let truncations = columns
        .iter()
        .zip(&truncated)
        .filter(|(_, n)| **n > 0)
        .map(|(col, &count)| ConversionWarning::TextTruncated {
            column: col.descriptor.name.clone(),
            width: col.descriptor.width,
            count,
        })
        .collect();

    Ok(SerializeStats {
        records: rows,
        bytes: rows * layout.record_size(),
        truncations,
    })
}

/// Serialize into an in-memory buffer.
pub fn encode_records(columns: &[ResolvedColumn]) -> ConvertResult<(Vec<u8>, SerializeStats)> {
    let mut buf = Vec::new();
    let stats = write_records(&mut buf, columns)?;
    Ok((buf, stats))
}

/// Render the `.formats` listing: one `name type` line per column, names left-aligned in a
/// [`FORMATS_NAME_WIDTH`] character column.
///
/// Longer names are written whole, so the listing always parses back as a format file.
pub fn render_formats(descriptors: &[ColumnDescriptor]) -> String {
    let mut out = String::new();
    for d in descriptors {
        out.push_str(&format!(
            "{:<width$} {}\n",
            d.name,
            d.field_type(),
            width = FORMATS_NAME_WIDTH
        ));
    }
    out
}

/// Returns the common row count, or an error if the values do not match their descriptors.
fn check_columns(columns: &[ResolvedColumn]) -> ConvertResult<usize> {
    let rows = columns.first().map(|c| c.values.len()).unwrap_or(0);
    for col in columns {
        if col.values.kind() != col.descriptor.kind {
            return Err(ConvertError::InvalidTable {
                message: format!(
                    "column '{}' is declared {} but holds {} values",
                    col.descriptor.name,
                    col.descriptor.kind,
                    col.values.kind()
                ),
            });
        }
        if col.values.len() != rows {
            return Err(ConvertError::InvalidTable {
                message: format!(
                    "column '{}' has {} values, expected {rows}",
                    col.descriptor.name,
                    col.values.len()
                ),
            });
        }
    }
    Ok(rows)
}

/// Append one field to `record`. Returns `true` if a text value was truncated.
fn encode_value(record: &mut Vec<u8>, col: &ResolvedColumn, row: usize) -> ConvertResult<bool> {
    let width = col.descriptor.width;
    match &col.values {
        ColumnValues::Integer(v) => {
            let x = v[row];
            let out_of_range = || ConvertError::InvalidTable {
                message: format!(
                    "column '{}' value {x} does not fit in {}",
                    col.descriptor.name,
                    col.descriptor.field_type()
                ),
            };
            match width {
                1 => record.extend_from_slice(&i8::try_from(x).map_err(|_| out_of_range())?.to_ne_bytes()),
                2 => record.extend_from_slice(&i16::try_from(x).map_err(|_| out_of_range())?.to_ne_bytes()),
                4 => record.extend_from_slice(&i32::try_from(x).map_err(|_| out_of_range())?.to_ne_bytes()),
                _ => record.extend_from_slice(&x.to_ne_bytes()),
            }
            Ok(false)
        }
        ColumnValues::Float(v) => {
            let x = v[row];
            match width {
                4 => record.extend_from_slice(&(x as f32).to_ne_bytes()),
                _ => record.extend_from_slice(&x.to_ne_bytes()),
            }
            Ok(false)
        }
        ColumnValues::Text(v) => {
            let bytes = v[row].as_bytes();
            let n = bytes.len().min(width);
            record.extend_from_slice(&bytes[..n]);
            record.resize(record.len() + (width - n), 0);
            Ok(bytes.len() > width)
        }
    }
}
