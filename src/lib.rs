//! `ds2bin` converts a tabular dataset into a packed binary record file, and generates C and
//! Fortran programs that read the file back and print the mean of every numeric column.
//!
//! The primary entrypoint is [`conversion::convert_path`], which detects the input format from
//! the file extension, converts the table, and writes four files next to each other:
//!
//! - `<base>.bin`: one fixed-size record per row, fields packed without padding, native byte order
//! - `<base>.c`: a packed struct declaration plus a reader program
//! - `<base>.f90`: the same layout as a Fortran derived type plus a reader program
//! - `<base>.formats`: one `name type` line per column
//!
//! ## Inputs (auto-detected by extension)
//!
//! - **CSV**: `.csv`, **TSV**: `.tsv`; column types are inferred from the text
//! - **Parquet**: `.parquet`, `.pq`; column types come from the file schema
//!
//! ## Field types
//!
//! Every column resolves to a [`types::ColumnDescriptor`] of one [`types::ColumnKind`]:
//!
//! - [`types::ColumnKind::Integer`]: signed, 4 or 8 bytes in the generated code
//! - [`types::ColumnKind::Float`]: 4 or 8 bytes
//! - [`types::ColumnKind::Character`]: fixed length, as wide as the longest value
//!
//! Two optional passes adjust the types before anything is written: *downcast* narrows float
//! columns that hold only exact integers, and a *format override* file forces types per column
//! (integer overrides are applied only when lossless). See [`processing`].
//!
//! ## Quick example
//!
//! ```rust
//! use ds2bin::conversion::Conversion;
//! use ds2bin::types::{Column, ColumnData, Table};
//!
//! let table = Table::new(vec![
//!     Column::new("a", ColumnData::Int32(vec![1, 2, 3])),
//!     Column::new("b", ColumnData::Utf8(vec!["hi".into(), "abcd".into(), "x".into()])),
//! ]);
//! let conversion = Conversion::prepare(&table, false, None).unwrap();
//! let (artifacts, _warnings) = conversion.render("example").unwrap();
//!
//! assert_eq!(conversion.layout().record_size(), 8);
//! assert_eq!(artifacts.binary.len(), 24);
//! assert!(artifacts.sources[0].text.contains("int32_t a;"));
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: table loaders (CSV/TSV, Parquet)
//! - [`processing`]: type resolution, downcast/override passes, binary layout and serializer
//! - [`codegen`]: grouped declarations and reader programs for C and Fortran
//! - [`conversion`]: the end-to-end pipeline, atomic output commit and observers
//! - [`types`]: table and descriptor types
//! - [`error`]: the error type shared by all of the above

pub mod codegen;
pub mod conversion;
pub mod error;
pub mod ingestion;
pub mod processing;
pub mod types;

pub use error::{ConvertError, ConvertResult};
