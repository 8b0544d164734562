//! The conversion engine.
//!
//! Stages, in run order:
//!
//! - [`resolve`]: native column types → [`crate::types::ColumnDescriptor`]s
//! - [`downcast`]: optional lossless float → integer narrowing
//! - [`overrides`]: optional user type overrides, validated for integer targets
//! - [`serialize`]: packed record layout, binary serializer and the `.formats` listing
//!
//! ## Example: resolve → serialize
//!
//! ```rust
//! use ds2bin::processing::{encode_records, resolve_table};
//! use ds2bin::types::{Column, ColumnData, Table};
//!
//! let table = Table::new(vec![
//!     Column::new("a", ColumnData::Int32(vec![1, 2, 3])),
//!     Column::new("b", ColumnData::Utf8(vec!["hi".into(), "abcd".into(), "x".into()])),
//! ]);
//! let columns = resolve_table(&table).unwrap();
//! let (bytes, stats) = encode_records(&columns).unwrap();
//!
//! // Three records of 4 + 4 bytes.
//! assert_eq!(stats.records, 3);
//! assert_eq!(bytes.len(), 24);
//! assert_eq!(&bytes[4..8], b"hi\0\0");
//! ```

pub mod downcast;
pub mod overrides;
pub mod resolve;
pub mod serialize;

pub use downcast::downcast_columns;
pub use overrides::{apply_overrides, parse_type_token, FormatOverride, OverrideEntry};
pub use resolve::{resolve_column, resolve_table};
pub use serialize::{
    encode_records, render_formats, write_records, DecodedValue, FieldSlot, RecordLayout,
    SerializeStats,
};
