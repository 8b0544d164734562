//! User-supplied type overrides (`f=<format-file>`).
//!
//! A format file lists one `<column-name> <type-token>` pair per line. Blank lines and lines
//! starting with `#` are ignored. Accepted tokens:
//!
//! - `int8`, `int16`, `int32`, `int64` (also `i1`, `i2`, `i4`, `i8`)
//! - `float32`, `float64` (also `f4`, `f8`)
//! - `S<n>` or `str<n>` for fixed-length text of `n >= 1` bytes
//!
//! Numpy-style shorthand may carry a byte-order prefix (`<i4`, `=f8`, `|S10`); it is ignored since
//! output is always native byte order.
//!
//! The `<base>.formats` listing written by a conversion run uses the same vocabulary, so it can be
//! edited and passed back with `f=`.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{ConvertError, ConvertResult};
use crate::types::{
    ColumnDescriptor, ColumnKind, ColumnValues, ConversionWarning, FieldType, ResolvedColumn,
};

use super::downcast::{fits_integer_width, float_to_integer_exact};

/// A single `column → requested type` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideEntry {
    pub column: String,
    pub requested: FieldType,
}

/// Ordered list of type overrides. Entries are applied in order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormatOverride {
    entries: Vec<OverrideEntry>,
}

impl FormatOverride {
    /// Create an override set from entries.
    pub fn new(entries: Vec<OverrideEntry>) -> Self {
        Self { entries }
    }

    /// Parse format file contents.
    pub fn parse(text: &str) -> ConvertResult<Self> {
        let mut entries = Vec::new();
        for (idx0, raw) in text.lines().enumerate() {
            let line = idx0 + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = trimmed.split_whitespace().collect();
            let [column, token] = parts.as_slice() else {
                return Err(ConvertError::InvalidFormatFile {
                    line,
                    message: format!(
                        "expected '<column-name> <type-token>', got {} field(s)",
                        parts.len()
                    ),
                });
            };
            let requested =
                parse_type_token(token).ok_or_else(|| ConvertError::InvalidFormatFile {
                    line,
                    message: format!("unknown type token '{token}'"),
                })?;

            entries.push(OverrideEntry {
                column: (*column).to_string(),
                requested,
            });
        }
        Ok(Self { entries })
    }

    /// Read and parse a format file.
    pub fn from_path(path: impl AsRef<Path>) -> ConvertResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn entries(&self) -> &[OverrideEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse a type token (see the module docs for the vocabulary).
pub fn parse_type_token(token: &str) -> Option<FieldType> {
    let token = token.trim_start_matches(['<', '>', '=', '|']);
    match token {
        "int8" | "i1" => Some(FieldType::integer(1)),
        "int16" | "i2" => Some(FieldType::integer(2)),
        "int32" | "i4" => Some(FieldType::integer(4)),
        "int64" | "i8" => Some(FieldType::integer(8)),
        "float32" | "f4" => Some(FieldType::float(4)),
        "float64" | "f8" => Some(FieldType::float(8)),
        _ => {
            let digits = token
                .strip_prefix("str")
                .or_else(|| token.strip_prefix('S'))?;
            if !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            match digits.parse::<usize>() {
                Ok(n) if n > 0 => Some(FieldType::character(n)),
                _ => None,
            }
        }
    }
}

/// Apply `overrides` to `columns` in entry order.
///
/// Every entry must name an existing column ([`ConvertError::UnknownColumn`] otherwise, checked
/// before anything is applied). Integer requests are applied only when every value round-trips
/// exactly; float and character requests are applied unconditionally, except that text which is
/// not a number cannot become a float. A rejected entry leaves the column as it was and yields a
/// [`ConversionWarning::OverrideRejected`].
pub fn apply_overrides(
    columns: &mut [ResolvedColumn],
    overrides: &FormatOverride,
) -> ConvertResult<Vec<ConversionWarning>> {
    for entry in overrides.entries() {
        if !columns.iter().any(|c| c.descriptor.name == entry.column) {
            return Err(ConvertError::UnknownColumn {
                column: entry.column.clone(),
            });
        }
    }

    let mut warnings = Vec::new();
    for entry in overrides.entries() {
        let Some(col) = columns
            .iter_mut()
            .find(|c| c.descriptor.name == entry.column)
        else {
            continue;
        };

        match convert_values(&col.values, &col.descriptor, entry.requested) {
            Ok(values) => {
                col.descriptor = ColumnDescriptor::new(entry.column.clone(), entry.requested);
                col.values = values;
            }
            Err(reason) => warnings.push(ConversionWarning::OverrideRejected {
                column: entry.column.clone(),
                requested: entry.requested,
                reason,
            }),
        }
    }
    Ok(warnings)
}

/// Convert `values` (currently typed as `from`) to the requested field type.
///
/// Returns the rejection reason when the conversion is not allowed.
fn convert_values(
    values: &ColumnValues,
    from: &ColumnDescriptor,
    to: FieldType,
) -> Result<ColumnValues, String> {
    match to.kind {
        ColumnKind::Integer => to_integers(values, from, to).map(ColumnValues::Integer),
        ColumnKind::Float => to_floats(values, to.width).map(ColumnValues::Float),
        ColumnKind::Character => Ok(ColumnValues::Text(to_text(values, from))),
    }
}

fn to_integers(values: &ColumnValues, from: &ColumnDescriptor, to: FieldType) -> Result<Vec<i64>, String> {
    match values {
        ColumnValues::Integer(v) => {
            if let Some(bad) = v.iter().find(|&&x| !fits_integer_width(x, to.width)) {
                return Err(too_large(bad, to));
            }
            Ok(v.clone())
        }
        ColumnValues::Float(v) => v
            .iter()
            .map(|&x| match float_to_integer_exact(x, from.width) {
                Some(i) if fits_integer_width(i, to.width) => Ok(i),
                Some(_) => Err(too_large(x, to)),
                None => Err(format!("value {x} is not an exact integer")),
            })
            .collect(),
        ColumnValues::Text(v) => v
            .iter()
            .map(|s| match s.parse::<i64>() {
                Ok(i) if i.to_string() == *s && fits_integer_width(i, to.width) => Ok(i),
                Ok(i) if i.to_string() == *s => Err(too_large(i, to)),
                _ => Err(format!("text '{s}' is not an integer")),
            })
            .collect(),
    }
}

fn too_large(value: impl fmt::Display, to: FieldType) -> String {
    format!("value {value} does not fit in {to}")
}

fn to_floats(values: &ColumnValues, width: usize) -> Result<Vec<f64>, String> {
    let round = |x: f64| if width == 4 { f64::from(x as f32) } else { x };
    match values {
        ColumnValues::Integer(v) => Ok(v.iter().map(|&i| round(i as f64)).collect()),
        ColumnValues::Float(v) => Ok(v.iter().map(|&x| round(x)).collect()),
        ColumnValues::Text(v) => v
            .iter()
            .map(|s| {
                s.trim()
                    .parse::<f64>()
                    .map(round)
                    .map_err(|_| format!("text '{s}' is not a number"))
            })
            .collect(),
    }
}

fn to_text(values: &ColumnValues, from: &ColumnDescriptor) -> Vec<String> {
    match values {
        ColumnValues::Integer(v) => v.iter().map(|i| i.to_string()).collect(),
        ColumnValues::Float(v) if from.width == 4 => v.iter().map(|&x| (x as f32).to_string()).collect(),
        ColumnValues::Float(v) => v.iter().map(|x| x.to_string()).collect(),
        ColumnValues::Text(v) => v.clone(),
    }
}
