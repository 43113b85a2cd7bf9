//! Convert an Excel workbook into a dual-layer HTML document.
//!
//! ```text
//! cargo run --example convert -- report.xlsx -o report.html --focus Summary
//! RUST_LOG=xlsxdual=debug cargo run --example convert -- report.xlsx --json
//! ```

use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use xlsxdual::{DocumentInfo, ProcessorBuilder};

#[derive(Parser, Debug)]
#[command(name = "convert", about = "Excel workbook to dual-layer HTML")]
struct Cli {
    /// Input workbook (.xlsx, .xlsm, .xls, .xlsb, .ods)
    input: PathBuf,

    /// Output HTML path (defaults to the input path with an .html extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the processing record as JSON instead of writing HTML
    #[arg(long)]
    json: bool,

    /// Download link shown under each sheet
    #[arg(long = "source-url")]
    source_url: Option<String>,

    /// Sheet to scroll to when the document opens
    #[arg(long)]
    focus: Option<String>,

    /// Worker pool size
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Fixed anchor seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    let mut builder = ProcessorBuilder::new().with_worker_count(cli.workers);
    if let Some(seed) = cli.seed {
        builder = builder.with_anchor_seed(seed);
    }
    let processor = builder.build()?;

    let filename = cli
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workbook".to_string());
    let mut info = DocumentInfo::new(filename);
    if let Some(url) = cli.source_url {
        info = info.with_source_url(url);
    }
    if let Some(sheet) = cli.focus {
        info = info.with_focus_sheet(sheet);
    }

    let result = processor.process(File::open(&cli.input)?, &info)?;

    if cli.json {
        println!("{}", result.to_json()?);
        return Ok(());
    }

    let output = cli.output.unwrap_or_else(|| cli.input.with_extension("html"));
    std::fs::write(&output, &result.combined)?;
    info!(
        output = %output.display(),
        sheets = result.sheets.len(),
        "document written"
    );
    for (sheet, anchor) in result.anchor_map() {
        println!("{}\t#{}", sheet, anchor);
    }

    Ok(())
}
