//! Unified loading entrypoint.
//!
//! [`load_table`] reads a file into an in-memory [`crate::types::Table`]. If no format is given,
//! it is inferred from the file extension.

use std::path::Path;

use crate::error::{ConvertError, ConvertResult};
use crate::types::Table;

use super::{csv, parquet};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Comma-separated values.
    Csv,
    /// Tab-separated values.
    Tsv,
    /// Apache Parquet.
    Parquet,
}

impl InputFormat {
    /// Parse an input format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "tsv" | "tab" => Some(Self::Tsv),
            "parquet" | "pq" => Some(Self::Parquet),
            _ => None,
        }
    }

    /// Infer the format of `path` from its extension.
    ///
    /// Fails with [`ConvertError::UnsupportedInputFormat`] if the path has no extension or an
    /// unknown one.
    pub fn from_path(path: &Path) -> ConvertResult<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConvertError::UnsupportedInputFormat {
                path: path.display().to_string(),
                message: "path has no extension (expected .csv, .tsv or .parquet)".to_string(),
            })?;

        Self::from_extension(ext).ok_or_else(|| ConvertError::UnsupportedInputFormat {
            path: path.display().to_string(),
            message: format!("unknown extension '{ext}' (expected .csv, .tsv or .parquet)"),
        })
    }
}

/// Load `path` into a [`Table`].
///
/// If `format` is `None`, it is inferred from the file extension before the file is opened.
///
/// ```no_run
/// use ds2bin::ingestion::load_table;
///
/// # fn main() -> Result<(), ds2bin::ConvertError> {
/// let table = load_table("survey.csv", None)?;
/// println!("rows={} columns={}", table.row_count(), table.columns.len());
/// # Ok(())
/// # }
/// ```
pub fn load_table(path: impl AsRef<Path>, format: Option<InputFormat>) -> ConvertResult<Table> {
    let path = path.as_ref();
    let format = match format {
        Some(f) => f,
        None => InputFormat::from_path(path)?,
    };

    match format {
        InputFormat::Csv => csv::load_csv_from_path(path, b','),
        InputFormat::Tsv => csv::load_csv_from_path(path, b'\t'),
        InputFormat::Parquet => parquet::load_parquet_from_path(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_are_detected_case_insensitively() {
        assert_eq!(InputFormat::from_extension("CSV"), Some(InputFormat::Csv));
        assert_eq!(InputFormat::from_extension("tsv"), Some(InputFormat::Tsv));
        assert_eq!(InputFormat::from_extension("Pq"), Some(InputFormat::Parquet));
        assert_eq!(InputFormat::from_extension("xlsx"), None);
    }

    #[test]
    fn unknown_or_missing_extensions_are_rejected() {
        for p in ["data.sav", "data"] {
            let err = InputFormat::from_path(Path::new(p)).unwrap_err();
            assert!(matches!(err, ConvertError::UnsupportedInputFormat { .. }), "{p}: {err}");
        }
    }

    #[test]
    fn format_is_checked_before_the_file_is_opened() {
        let err = load_table("does/not/exist.json", None).unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedInputFormat { .. }));
    }
}
