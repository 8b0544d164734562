use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ConvertError;
use crate::ingestion::InputFormat;
use crate::types::{ConversionWarning, Table};

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConversionSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (conversion failed).
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

impl fmt::Display for ConversionSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConversionSeverity::Info => "info",
            ConversionSeverity::Warning => "warning",
            ConversionSeverity::Error => "error",
            ConversionSeverity::Critical => "critical",
        })
    }
}

impl ConversionSeverity {
    /// Severity of a fatal conversion error.
    pub fn for_error(e: &ConvertError) -> Self {
        match e {
            ConvertError::Io(_) => ConversionSeverity::Critical,
            ConvertError::Csv(err) => match err.kind() {
                ::csv::ErrorKind::Io(_) => ConversionSeverity::Critical,
                _ => ConversionSeverity::Error,
            },
            _ => ConversionSeverity::Error,
        }
    }
}

/// Context about a conversion run.
#[derive(Debug, Clone)]
pub struct ConversionContext {
    /// Input path, or a label for in-memory tables.
    pub source: PathBuf,
    /// Input format, once known.
    pub format: Option<InputFormat>,
}

/// Stats reported on a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionStats {
    /// Records written to the binary file.
    pub rows: usize,
    /// Fields per record.
    pub columns: usize,
    /// Size of one record in bytes.
    pub record_size: usize,
    /// Number of warnings raised during the run.
    pub warnings: usize,
}

/// Observer interface for conversion outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait ConversionObserver: Send + Sync {
    /// Called once the input table is in memory, before any type resolution.
    fn on_loaded(&self, _ctx: &ConversionContext, _table: &Table) {}

    /// Called once all artifacts have been written.
    fn on_success(&self, _ctx: &ConversionContext, _stats: ConversionStats) {}

    /// Called for each non-fatal warning (rejected override, truncated text).
    fn on_warning(&self, _ctx: &ConversionContext, _warning: &ConversionWarning) {}

    /// Called when the run fails.
    fn on_failure(&self, _ctx: &ConversionContext, _severity: ConversionSeverity, _error: &ConvertError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConvertError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ConversionObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn ConversionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl ConversionObserver for CompositeObserver {
    fn on_loaded(&self, ctx: &ConversionContext, table: &Table) {
        for o in &self.observers {
            o.on_loaded(ctx, table);
        }
    }

    fn on_success(&self, ctx: &ConversionContext, stats: ConversionStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_warning(&self, ctx: &ConversionContext, warning: &ConversionWarning) {
        for o in &self.observers {
            o.on_warning(ctx, warning);
        }
    }

    fn on_failure(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConvertError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConvertError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs conversion events to stderr, one `[ds2bin]` line per event.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl ConversionObserver for StdErrObserver {
    fn on_loaded(&self, ctx: &ConversionContext, table: &Table) {
        eprintln!("[ds2bin] {}", render(ctx, Event::Loaded(table)));
    }

    fn on_success(&self, ctx: &ConversionContext, stats: ConversionStats) {
        eprintln!("[ds2bin] {}", render(ctx, Event::Success(stats)));
    }

    fn on_warning(&self, ctx: &ConversionContext, warning: &ConversionWarning) {
        eprintln!("[ds2bin] {}", render(ctx, Event::Warning(warning)));
    }

    fn on_failure(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConvertError) {
        eprintln!("[ds2bin] {}", render(ctx, Event::Failure(severity, error)));
    }

    fn on_alert(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConvertError) {
        eprintln!("[ds2bin] {}", render(ctx, Event::Alert(severity, error)));
    }
}

/// Appends conversion events to a log file, each line prefixed with a unix timestamp.
///
/// Writes are best-effort; failures to open or write the log file are ignored.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append(&self, ctx: &ConversionContext, event: Event<'_>) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{} {}", unix_ts(), render(ctx, event));
        }
    }
}

impl ConversionObserver for FileObserver {
    fn on_loaded(&self, ctx: &ConversionContext, table: &Table) {
        self.append(ctx, Event::Loaded(table));
    }

    fn on_success(&self, ctx: &ConversionContext, stats: ConversionStats) {
        self.append(ctx, Event::Success(stats));
    }

    fn on_warning(&self, ctx: &ConversionContext, warning: &ConversionWarning) {
        self.append(ctx, Event::Warning(warning));
    }

    fn on_failure(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConvertError) {
        self.append(ctx, Event::Failure(severity, error));
    }

    fn on_alert(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConvertError) {
        self.append(ctx, Event::Alert(severity, error));
    }
}

/// One observer callback, as rendered by the text observers.
enum Event<'a> {
    Loaded(&'a Table),
    Success(ConversionStats),
    Warning(&'a ConversionWarning),
    Failure(ConversionSeverity, &'a ConvertError),
    Alert(ConversionSeverity, &'a ConvertError),
}

fn render(ctx: &ConversionContext, event: Event<'_>) -> String {
    let format = ctx
        .format
        .map(|f| format!("{f:?}").to_ascii_lowercase())
        .unwrap_or_else(|| "unknown".to_string());
    let source = format!("source={} format={format}", ctx.source.display());
    match event {
        Event::Loaded(table) => format!(
            "loaded {source} rows={} columns={}",
            table.row_count(),
            table.columns.len()
        ),
        Event::Success(stats) => format!(
            "ok {source} rows={} columns={} record_size={} warnings={}",
            stats.rows, stats.columns, stats.record_size, stats.warnings
        ),
        Event::Warning(w) => format!("warning {source}: {w}"),
        Event::Failure(severity, e) => format!("{severity} {source}: {e}"),
        Event::Alert(severity, e) => format!("ALERT {severity} {source}: {e}"),
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
