//! Conversion pipeline.
//!
//! Most callers should use [`convert_path`], which:
//!
//! - detects the input format from the extension (or uses [`ConvertOptions::format`])
//! - loads the table, resolves column types, and applies the optional downcast and override passes
//! - validates every field width and name for both the binary layout and the generated declarations
//! - renders `<base>.bin`, `<base>.c`, `<base>.f90` and `<base>.formats` in memory
//! - commits all four files together, or none of them
//! - optionally reports success/warnings/failure/alerts to a [`ConversionObserver`]
//!
//! Every fatal error is detected before the first output file is touched.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ds2bin::conversion::{convert_path, ConvertOptions, StdErrObserver};
//!
//! # fn main() -> Result<(), ds2bin::ConvertError> {
//! let opts = ConvertOptions {
//!     downcast: true,
//!     observer: Some(Arc::new(StdErrObserver)),
//!     ..Default::default()
//! };
//! let report = convert_path("survey.csv", &opts)?;
//! println!("wrote {} records of {} bytes", report.rows, report.record_size);
//! # Ok(())
//! # }
//! ```

mod artifacts;
pub mod observability;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::codegen::{self, Fortran, TargetLanguage, C};
use crate::error::{ConvertError, ConvertResult};
use crate::ingestion::{load_table, InputFormat};
use crate::processing::{
    apply_overrides, downcast_columns, encode_records, resolve_table, FormatOverride, RecordLayout,
};
use crate::types::{ColumnDescriptor, ConversionWarning, ResolvedColumn, Table};

pub use artifacts::{Artifacts, GeneratedSource};
pub use observability::{
    CompositeObserver, ConversionContext, ConversionObserver, ConversionSeverity, ConversionStats,
    FileObserver, StdErrObserver,
};

/// Languages a reader program is generated for, in output order.
const TARGETS: [&dyn TargetLanguage; 2] = [&C, &Fortran];

/// Options controlling a conversion run.
///
/// Use [`Default`] for a plain conversion into the current directory.
#[derive(Clone)]
pub struct ConvertOptions {
    /// If `None`, detect the input format from the file extension.
    pub format: Option<InputFormat>,
    /// Narrow float columns holding only exact integers.
    pub downcast: bool,
    /// User type overrides, applied after the downcast pass.
    pub overrides: Option<FormatOverride>,
    /// Directory receiving the output files.
    pub output_dir: PathBuf,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn ConversionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: ConversionSeverity,
}

impl fmt::Debug for ConvertOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertOptions")
            .field("format", &self.format)
            .field("downcast", &self.downcast)
            .field("overrides", &self.overrides.as_ref().map(|o| o.entries().len()))
            .field("output_dir", &self.output_dir)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            format: None,
            downcast: false,
            overrides: None,
            output_dir: PathBuf::from("."),
            observer: None,
            alert_at_or_above: ConversionSeverity::Critical,
        }
    }
}

impl ConvertOptions {
    /// Enable the pass selected by a command-line mode, reading the format file if needed.
    pub fn with_mode(mut self, mode: &RunMode) -> ConvertResult<Self> {
        match mode {
            RunMode::Plain => {}
            RunMode::Downcast => self.downcast = true,
            RunMode::Formats(path) => self.overrides = Some(FormatOverride::from_path(path)?),
        }
        Ok(self)
    }
}

/// The optional second command-line argument: `downcast` or `f=<format-file>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Neither pass.
    #[default]
    Plain,
    /// `downcast`
    Downcast,
    /// `f=<format-file>`
    Formats(PathBuf),
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "downcast" {
            return Ok(RunMode::Downcast);
        }
        match s.strip_prefix("f=") {
            Some(path) if !path.is_empty() => Ok(RunMode::Formats(PathBuf::from(path))),
            Some(_) => Err("f= requires a format file path".to_string()),
            None => Err(format!("expected 'downcast' or 'f=<format-file>', got '{s}'")),
        }
    }
}

/// Finalized columns, ready for serialization and code generation.
///
/// Construction runs every validation step, so a `Conversion` can always be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    columns: Vec<ResolvedColumn>,
    descriptors: Vec<ColumnDescriptor>,
    layout: RecordLayout,
    row_count: usize,
    warnings: Vec<ConversionWarning>,
}

impl Conversion {
    /// Resolve `table`, apply the optional passes and validate the result.
    pub fn prepare(
        table: &Table,
        downcast: bool,
        overrides: Option<&FormatOverride>,
    ) -> ConvertResult<Self> {
        let mut columns = resolve_table(table)?;
        if downcast {
            downcast_columns(&mut columns);
        }
        let warnings = match overrides {
            Some(o) => apply_overrides(&mut columns, o)?,
            None => Vec::new(),
        };

        let descriptors: Vec<ColumnDescriptor> =
            columns.iter().map(|c| c.descriptor.clone()).collect();
        let layout = RecordLayout::new(&descriptors)?;
        codegen::validate_widths(&descriptors)?;
        codegen::validate_names(&descriptors)?;

        Ok(Self {
            columns,
            descriptors,
            layout,
            row_count: table.row_count(),
            warnings,
        })
    }

    pub fn columns(&self) -> &[ResolvedColumn] {
        &self.columns
    }

    /// Finalized descriptors, in record order.
    pub fn descriptors(&self) -> &[ColumnDescriptor] {
        &self.descriptors
    }

    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Rejected overrides.
    pub fn warnings(&self) -> &[ConversionWarning] {
        &self.warnings
    }

    /// Render every artifact for output base name `base`.
    ///
    /// The binary file and the reader programs are produced in parallel from the same
    /// descriptors. Also returns one truncation warning per column with overlong text.
    pub fn render(&self, base: &str) -> ConvertResult<(Artifacts, Vec<ConversionWarning>)> {
        let binary_file = format!("{base}.bin");
        let (encoded, sources) = rayon::join(
            || encode_records(&self.columns),
            || {
                TARGETS
                    .iter()
                    .map(|target| -> ConvertResult<GeneratedSource> {
                        let text = codegen::generate(
                            *target,
                            &self.descriptors,
                            &binary_file,
                            self.row_count,
                        )?;
                        Ok(GeneratedSource {
                            language: target.name(),
                            extension: target.extension(),
                            text,
                        })
                    })
                    .collect::<ConvertResult<Vec<_>>>()
            },
        );
        let (binary, stats) = encoded?;

        let artifacts = Artifacts {
            base: base.to_string(),
            binary,
            sources: sources?,
            formats: crate::processing::render_formats(&self.descriptors),
        };
        Ok((artifacts, stats.truncations))
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    /// Input path, or the base name for in-memory tables.
    pub source: PathBuf,
    pub format: Option<InputFormat>,
    /// Records written.
    pub rows: usize,
    /// Bytes per record.
    pub record_size: usize,
    /// Finalized column descriptors.
    pub columns: Vec<ColumnDescriptor>,
    /// Rejected overrides followed by truncation warnings.
    pub warnings: Vec<ConversionWarning>,
    /// Output files: binary, C, Fortran, formats listing.
    pub outputs: Vec<PathBuf>,
}

/// Convert the file at `path`, writing outputs named after its file stem.
///
/// When an observer is configured, this function reports:
///
/// - `on_warning` for every rejected override and truncated text column
/// - `on_success` once all outputs are written
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
pub fn convert_path(
    path: impl AsRef<Path>,
    options: &ConvertOptions,
) -> ConvertResult<ConversionReport> {
    let path = path.as_ref();
    let mut ctx = ConversionContext {
        source: path.to_path_buf(),
        format: options.format,
    };
    let result = run_path(path, options, &mut ctx);
    report_outcome(&ctx, options, &result);
    result
}

/// Convert an already loaded table, writing outputs named `<base>.*`.
pub fn convert_table(
    table: &Table,
    base: &str,
    options: &ConvertOptions,
) -> ConvertResult<ConversionReport> {
    let ctx = ConversionContext {
        source: PathBuf::from(base),
        format: options.format,
    };
    let result = run_table(table, base, options, &ctx);
    report_outcome(&ctx, options, &result);
    result
}

/// Owned conversion request, e.g. for queuing work.
#[derive(Debug, Clone)]
pub struct ConvertRequest {
    /// Path to the input file.
    pub input: PathBuf,
    /// Options controlling the run.
    pub options: ConvertOptions,
}

impl ConvertRequest {
    /// Execute the request by calling [`convert_path`].
    pub fn run(&self) -> ConvertResult<ConversionReport> {
        convert_path(&self.input, &self.options)
    }
}

fn run_path(
    path: &Path,
    options: &ConvertOptions,
    ctx: &mut ConversionContext,
) -> ConvertResult<ConversionReport> {
    let format = match options.format {
        Some(f) => f,
        None => InputFormat::from_path(path)?,
    };
    ctx.format = Some(format);

    let base = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConvertError::UnsupportedInputFormat {
            path: path.display().to_string(),
            message: "cannot derive an output name from the path".to_string(),
        })?;

    let table = load_table(path, Some(format))?;
    run_table(&table, base, options, ctx)
}

fn run_table(
    table: &Table,
    base: &str,
    options: &ConvertOptions,
    ctx: &ConversionContext,
) -> ConvertResult<ConversionReport> {
    if let Some(obs) = options.observer.as_ref() {
        obs.on_loaded(ctx, table);
    }
    let conversion = Conversion::prepare(table, options.downcast, options.overrides.as_ref())?;
    notify_warnings(ctx, options, conversion.warnings());

    let (artifacts, truncations) = conversion.render(base)?;
    notify_warnings(ctx, options, &truncations);

    let outputs = artifacts.write_to(&options.output_dir)?;

    let mut warnings = conversion.warnings().to_vec();
    warnings.extend(truncations);
    Ok(ConversionReport {
        source: ctx.source.clone(),
        format: ctx.format,
        rows: conversion.row_count(),
        record_size: conversion.layout().record_size(),
        columns: conversion.descriptors().to_vec(),
        warnings,
        outputs,
    })
}

fn notify_warnings(ctx: &ConversionContext, options: &ConvertOptions, warnings: &[ConversionWarning]) {
    if let Some(obs) = options.observer.as_ref() {
        for w in warnings {
            obs.on_warning(ctx, w);
        }
    }
}

fn report_outcome(
    ctx: &ConversionContext,
    options: &ConvertOptions,
    result: &ConvertResult<ConversionReport>,
) {
    let Some(obs) = options.observer.as_ref() else {
        return;
    };
    match result {
        Ok(report) => obs.on_success(
            ctx,
            ConversionStats {
                rows: report.rows,
                columns: report.columns.len(),
                record_size: report.record_size,
                warnings: report.warnings.len(),
            },
        ),
        Err(e) => {
            let sev = ConversionSeverity::for_error(e);
            obs.on_failure(ctx, sev, e);
            if sev >= options.alert_at_or_above {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::{DecodedValue, OverrideEntry};
    use crate::types::{Column, ColumnData, ColumnKind, FieldType};

    fn example_table() -> Table {
        Table::new(vec![
            Column::new("a", ColumnData::Int32(vec![1, 2, 3])),
            Column::new(
                "b",
                ColumnData::Utf8(vec!["hi".into(), "abcd".into(), "x".into()]),
            ),
        ])
    }

    #[test]
    fn run_modes_parse() {
        assert_eq!("downcast".parse::<RunMode>(), Ok(RunMode::Downcast));
        assert_eq!(
            "f=formats.txt".parse::<RunMode>(),
            Ok(RunMode::Formats(PathBuf::from("formats.txt")))
        );
        assert!("f=".parse::<RunMode>().is_err());
        assert!("fast".parse::<RunMode>().is_err());
    }

    #[test]
    fn prepare_resolves_and_lays_out_columns() {
        let conv = Conversion::prepare(&example_table(), false, None).unwrap();
        assert_eq!(conv.row_count(), 3);
        assert_eq!(conv.layout().record_size(), 8);
        assert_eq!(conv.descriptors()[1].field_type(), FieldType::character(4));
        assert!(conv.warnings().is_empty());
    }

    #[test]
    fn render_produces_all_artifacts_from_one_layout() {
        let conv = Conversion::prepare(&example_table(), false, None).unwrap();
        let (artifacts, truncations) = conv.render("example").unwrap();

        assert!(truncations.is_empty());
        assert_eq!(artifacts.binary.len(), 24);
        assert_eq!(
            conv.layout().decode_field(&artifacts.binary[8..16], 1),
            Some(DecodedValue::Text(b"abcd".to_vec()))
        );
        let langs: Vec<&str> = artifacts.sources.iter().map(|s| s.language).collect();
        assert_eq!(langs, vec!["C", "Fortran"]);
        assert!(artifacts.sources[0].text.contains("fopen(\"example.bin\", \"rb\")"));
        assert!(artifacts.sources[1].text.contains("file='example.bin'"));
        assert_eq!(artifacts.formats.lines().count(), 2);
    }

    #[test]
    fn downcast_to_narrow_integers_fails_before_rendering() {
        let table = Table::new(vec![Column::new("f", ColumnData::Float64(vec![1.0, 2.0]))]);
        let err = Conversion::prepare(&table, true, None).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::UnsupportedWidth { kind: ColumnKind::Integer, width: 1, .. }
        ));
    }

    #[test]
    fn override_after_downcast_wins() {
        let table = Table::new(vec![Column::new("f", ColumnData::Float64(vec![1.0, 2.0]))]);
        let overrides = FormatOverride::new(vec![OverrideEntry {
            column: "f".to_string(),
            requested: FieldType::integer(4),
        }]);
        let conv = Conversion::prepare(&table, true, Some(&overrides)).unwrap();
        assert_eq!(conv.descriptors()[0].field_type(), FieldType::integer(4));
    }
}
