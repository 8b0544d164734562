use thiserror::Error;

use crate::types::ColumnKind;

/// Convenience result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Error type returned by loading, resolution, code generation and artifact writing.
///
/// Every variant is fatal for a conversion run: no artifacts are committed once one of these is
/// returned. Recoverable conditions are reported as [`crate::types::ConversionWarning`]s instead.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV/TSV loading error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Parquet loading error.
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// The input path does not select a known loader.
    #[error("unsupported input format for '{path}': {message}")]
    UnsupportedInputFormat { path: String, message: String },

    /// A column's native element type has no binary representation.
    #[error("column '{column}' has unsupported type '{type_tag}'")]
    UnsupportedType { column: String, type_tag: String },

    /// A format override names a column that is not in the table.
    #[error("format override names unknown column '{column}'")]
    UnknownColumn { column: String },

    /// The format override file could not be parsed.
    #[error("invalid format file at line {line}: {message}")]
    InvalidFormatFile { line: usize, message: String },

    /// A field width cannot be expressed by the binary layout or the generated declarations.
    #[error("column '{column}' has unsupported {kind} width {width}")]
    UnsupportedWidth {
        column: String,
        kind: ColumnKind,
        width: usize,
    },

    /// A column name cannot be declared as a field in the generated C and Fortran sources.
    #[error("column name '{column}' cannot be used in generated code: {reason}")]
    InvalidColumnName { column: String, reason: String },

    /// The in-memory table violates a structural invariant (ragged columns, duplicate names, ...).
    #[error("invalid table: {message}")]
    InvalidTable { message: String },
}
