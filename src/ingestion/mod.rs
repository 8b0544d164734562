//! Table loaders.
//!
//! Most callers should use [`load_table`] (from [`unified`]) which picks a loader by file
//! extension (or an explicit [`InputFormat`]) and returns a fully populated
//! [`crate::types::Table`]: loaders fill missing cells, so the conversion engine never sees gaps.
//!
//! Format-specific functions are also available under:
//! - [`csv`] (also used for tab-separated files)
//! - [`parquet`]

pub mod csv;
pub mod parquet;
pub mod unified;

pub use unified::{load_table, InputFormat};
