//! xlsxdual - Excel workbooks as dual-layer HTML for RAG systems
//!
//! This crate turns a spreadsheet workbook into one self-contained HTML document that
//! serves two readers at once:
//!
//! - a retrieval (RAG) consumer, which reads hidden per-row text where every line carries
//!   its sheet name and row number (`source:Sheet1 | row:2 | Name:Alice , Age:30`)
//! - a human viewer, whose browser decodes a base64-embedded table preview after load, so the
//!   table markup never appears as literal text in the retrieval layer
//!
//! Sheets are normalized (blank rows/columns dropped, sparse section-title rows merged into
//! the header, vertically merged cells in the first two columns filled down), processed on a
//! bounded worker pool, and assembled in the workbook's declared order behind a single
//! table of contents, stylesheet and script.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::fs::File;
//! use xlsxdual::{DocumentInfo, ProcessorBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a processor with default settings
//!     let processor = ProcessorBuilder::new().build()?;
//!
//!     // Open input Excel file
//!     let input = File::open("example.xlsx")?;
//!
//!     // Process it into a combined document plus per-sheet fragments
//!     let result = processor.process(input, &DocumentInfo::new("example.xlsx"))?;
//!
//!     std::fs::write("example.html", &result.combined)?;
//!     for (sheet, anchor) in result.anchor_map() {
//!         println!("{} -> #{}", sheet, anchor);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use xlsxdual::{DocumentInfo, ProcessorBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let processor = ProcessorBuilder::new()
//!         .with_worker_count(8)        // larger pool for wide workbooks
//!         .with_max_preview_rows(500)  // smaller browser previews
//!         .with_anchor_seed(7)         // reproducible anchor ids
//!         .build()?;
//!
//!     let info = DocumentInfo::new("report.xlsx")
//!         .with_source_url("https://files.example.com/download/report.xlsx")
//!         .with_focus_sheet("Summary");
//!
//!     let bytes = std::fs::read("report.xlsx")?;
//!     let result = processor.process_bytes(bytes, &info)?;
//!     println!("{}", result.to_json()?);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Building Blocks
//!
//! The pipeline stages are public and can be used on their own:
//!
//! ```rust
//! use xlsxdual::{PreviewEncoder, RawSheet, SemanticSummaryBuilder, TableNormalizer};
//!
//! let sheet = RawSheet::from_strings(
//!     "Sales",
//!     &[&["Sales", "", ""], &["Region", "Q1", "Q2"], &["East", "10", "12"]],
//! );
//! let table = TableNormalizer::normalize(&sheet).unwrap();
//! assert_eq!(table.columns, vec!["Sales_Region", "Sales_Q1", "Sales_Q2"]);
//!
//! let lines = SemanticSummaryBuilder::default().build(&table, "Sales");
//! assert_eq!(lines[0].text, "source:Sales | row:3 | Sales_Region:East , Sales_Q1:10 , Sales_Q2:12");
//!
//! let preview = PreviewEncoder::default().encode(&table).unwrap();
//! assert!(PreviewEncoder::decode(&preview.blob).unwrap().contains("<td>East</td>"));
//! ```

mod anchor;
mod api;
mod assembler;
mod builder;
mod dispatch;
mod error;
mod formatter;
mod normalize;
mod output;
mod parser;
mod pipeline;
mod preview;
mod security;
mod summary;
mod types;

// 公開API
pub use anchor::{AnchorRegistry, SheetAnchor};
pub use api::{CellValue, RawSheet};
pub use assembler::DocumentAssembler;
pub use builder::{DocumentInfo, ProcessingConfig, Processor, ProcessorBuilder};
pub use dispatch::{DispatchOutcome, ParallelDispatcher, WorkerPool};
pub use error::XlsxDualError;
pub use normalize::TableNormalizer;
pub use pipeline::SheetPipeline;
pub use preview::{EncodedPreview, PreviewEncoder};
pub use summary::SemanticSummaryBuilder;
pub use types::{
    AnchorEntry, DocumentArtifact, HeaderMode, NormalizedRow, NormalizedTable, ProcessedWorkbook,
    SemanticLine, SheetFragment, SheetOutput, TocEntry,
};
