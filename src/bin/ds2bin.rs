use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use ds2bin::conversion::{
    convert_path, CompositeObserver, ConversionContext, ConversionObserver, ConvertOptions,
    FileObserver, RunMode, StdErrObserver,
};
use ds2bin::types::Table;

/// ds2bin - convert a dataset into a packed binary file plus C and Fortran readers
#[derive(Parser, Debug)]
#[command(name = "ds2bin")]
#[command(version)]
#[command(about = "Convert a CSV/TSV/Parquet dataset into a binary file readable from C and Fortran", long_about = None)]
struct Cli {
    /// Input dataset (.csv, .tsv, .parquet)
    input: PathBuf,

    /// `downcast` to narrow integral float columns, or `f=<file>` to apply a format file
    #[arg(value_parser = clap::value_parser!(RunMode))]
    mode: Option<RunMode>,

    /// Directory receiving the output files
    #[arg(short = 'o', long = "out-dir", default_value = ".")]
    out_dir: PathBuf,

    /// Append conversion events to this file
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    /// Rows of the loaded table to print before converting (0 disables the preview)
    #[arg(long, default_value_t = 5)]
    preview: usize,
}

/// Prints the first rows of the loaded table to stdout.
struct PreviewObserver {
    rows: usize,
}

impl ConversionObserver for PreviewObserver {
    fn on_loaded(&self, _ctx: &ConversionContext, table: &Table) {
        println!("{}", table.head(self.rows));
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut observers: Vec<Arc<dyn ConversionObserver>> = vec![Arc::new(StdErrObserver)];
    if cli.preview > 0 {
        observers.push(Arc::new(PreviewObserver { rows: cli.preview }));
    }
    if let Some(path) = &cli.log_file {
        observers.push(Arc::new(FileObserver::new(path)));
    }

    let options = ConvertOptions {
        output_dir: cli.out_dir.clone(),
        observer: Some(Arc::new(CompositeObserver::new(observers))),
        ..Default::default()
    };
    let options = match options.with_mode(&cli.mode.clone().unwrap_or_default()) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("ds2bin: {e}");
            return ExitCode::FAILURE;
        }
    };

    match convert_path(&cli.input, &options) {
        Ok(report) => {
            println!("Conversion completed\n");
            println!("Input  = {}", report.source.display());
            println!("Rows   = {} ({} bytes per record)", report.rows, report.record_size);
            for (i, path) in report.outputs.iter().enumerate() {
                let label = if i == 0 { "Output =" } else { "        " };
                println!("{label} {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("ds2bin: {e}");
            ExitCode::FAILURE
        }
    }
}
