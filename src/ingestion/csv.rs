//! CSV/TSV loading with per-column type inference.

use std::path::Path;

use crate::error::ConvertResult;
use crate::types::{Column, ColumnData, Table};

/// Load a delimited text file into a [`Table`].
///
/// Rules:
///
/// - The file must have a header row; header names become column names.
/// - Every row must have the same number of fields as the header.
/// - Column types are inferred over all rows (see [`infer_column`]).
pub fn load_csv_from_path(path: impl AsRef<Path>, delimiter: u8) -> ConvertResult<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .from_path(path)?;
    load_csv_from_reader(&mut rdr)
}

/// Load delimited text from an existing CSV reader.
pub fn load_csv_from_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> ConvertResult<Table> {
    let headers = rdr.headers()?.clone();

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for result in rdr.records() {
        let record = result?;
        for (values, field) in raw.iter_mut().zip(record.iter()) {
            values.push(field.trim().to_owned());
        }
    }

    let columns = headers
        .iter()
        .zip(raw)
        .map(|(name, values)| infer_column(name.trim(), values))
        .collect();
    Ok(Table::new(columns))
}

/// Infer a column's type from its raw text values and fill missing (empty) cells.
///
/// - all present values are integers → `Int64`, or `Float64` if any cell is missing
/// - all present values are numbers → `Float64`
/// - all values are `true`/`false` (any case) and none is missing → `Bool`
/// - otherwise → `Utf8`
///
/// Missing numeric cells become zero and missing text cells become empty strings. A column with
/// no present values at all is `Float64` zeros.
pub fn infer_column(name: &str, values: Vec<String>) -> Column {
    let present: Vec<&String> = values.iter().filter(|v| !v.is_empty()).collect();
    let any_missing = present.len() < values.len();

    if present.is_empty() {
        return Column::new(name, ColumnData::Float64(vec![0.0; values.len()]));
    }

    if present.iter().all(|v| v.parse::<i64>().is_ok()) {
        let ints = values.iter().map(|v| v.parse::<i64>().unwrap_or(0));
        let data = if any_missing {
            ColumnData::Float64(ints.map(|i| i as f64).collect())
        } else {
            ColumnData::Int64(ints.collect())
        };
        return Column::new(name, data);
    }

    if present.iter().all(|v| v.parse::<f64>().is_ok()) {
        let floats = values.iter().map(|v| v.parse::<f64>().unwrap_or(0.0)).collect();
        return Column::new(name, ColumnData::Float64(floats));
    }

    if !any_missing && values.iter().all(|v| parse_bool(v).is_some()) {
        let bools = values.iter().map(|v| parse_bool(v).unwrap_or(false)).collect();
        return Column::new(name, ColumnData::Bool(bools));
    }

    Column::new(name, ColumnData::Utf8(values))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
