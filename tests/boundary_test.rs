//! Boundary Tests for xlsxdual
//!
//! Row caps, empty sheets and workbooks, and unreadable input.

use rust_xlsxwriter::*;
use std::io::Cursor;
use xlsxdual::{DocumentInfo, PreviewEncoder, ProcessorBuilder, XlsxDualError};

// Helper module for generating boundary test fixtures
mod fixtures {
    use super::*;

    /// A workbook whose only sheet has no cells
    pub fn generate_empty_workbook() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        // rust_xlsxwriter always requires at least one sheet
        let _worksheet = workbook.add_worksheet();
        Ok(workbook.save_to_buffer()?)
    }

    /// Data sheets around an empty one, plus a sheet of blank strings
    pub fn generate_with_empty_sheets() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();

        let first = workbook.add_worksheet();
        first.set_name("First")?;
        first.write_string(0, 0, "A")?;
        first.write_string(1, 0, "1")?;

        let empty = workbook.add_worksheet();
        empty.set_name("EmptySheet")?;

        let blank = workbook.add_worksheet();
        blank.set_name("BlankStrings")?;
        blank.write_string(0, 0, "")?;
        blank.write_blank(1, 1, &Format::new().set_bold())?;

        let last = workbook.add_worksheet();
        last.set_name("Last")?;
        last.write_string(0, 0, "B")?;
        last.write_string(1, 0, "2")?;

        Ok(workbook.save_to_buffer()?)
    }

    /// A single sheet with `rows` data rows under a two-column header
    pub fn generate_long_table(rows: u32) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Big")?;

        worksheet.write_string(0, 0, "Id")?;
        worksheet.write_string(0, 1, "Label")?;
        for row in 1..=rows {
            worksheet.write_number(row, 0, row as f64)?;
            worksheet.write_string(row, 1, &format!("item-{}", row))?;
        }

        Ok(workbook.save_to_buffer()?)
    }

    /// A section title over a header row, with nothing under them
    pub fn generate_header_only() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, "Sales")?;
        worksheet.write_string(1, 0, "Region")?;
        worksheet.write_string(1, 1, "Q1")?;
        worksheet.write_string(1, 2, "Q2")?;
        Ok(workbook.save_to_buffer()?)
    }

    /// A single row of values
    pub fn generate_single_row() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 1, "only")?;
        worksheet.write_string(0, 2, "row")?;
        Ok(workbook.save_to_buffer()?)
    }

    /// A very long cell value
    pub fn generate_long_cell() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, "Text")?;
        worksheet.write_string(1, 0, &"あ".repeat(32_000))?;
        Ok(workbook.save_to_buffer()?)
    }

    pub fn generate_corrupted_file() -> Vec<u8> {
        b"This is not a valid Excel file content".to_vec()
    }

    /// ZIP signature followed by garbage
    pub fn generate_invalid_structure() -> Vec<u8> {
        let mut data = vec![0x50, 0x4B, 0x03, 0x04];
        data.extend_from_slice(b"INVALID_CONTENT");
        data
    }
}

const PLACEHOLDER: &str = "Empty file or nothing to display";

#[test]
fn test_empty_workbook_placeholder() {
    let processor = ProcessorBuilder::new().build().unwrap();
    let result = processor
        .process(
            Cursor::new(fixtures::generate_empty_workbook().unwrap()),
            &DocumentInfo::new("empty.xlsx"),
        )
        .unwrap();

    assert!(result.sheets.is_empty());
    assert!(result.anchors.is_empty());
    assert!(result.combined.contains(PLACEHOLDER));
    assert!(!result.combined.contains("file-toc\">"));
    assert_eq!(result.combined.matches("<meta charset").count(), 1);
}

#[test]
fn test_empty_sheets_are_omitted() {
    let processor = ProcessorBuilder::new().build().unwrap();
    let result = processor
        .process_bytes(
            fixtures::generate_with_empty_sheets().unwrap(),
            &DocumentInfo::new("mixed.xlsx"),
        )
        .unwrap();

    assert_eq!(result.sheet_names(), vec!["First", "Last"]);
    assert_eq!(result.anchors.len(), 2);
    assert!(!result.combined.contains("EmptySheet"));
    assert!(!result.combined.contains("BlankStrings"));
    assert!(!result.combined.contains(PLACEHOLDER));
}

#[test]
fn test_preview_and_summary_caps() {
    let processor = ProcessorBuilder::new().build().unwrap();
    let result = processor
        .process_bytes(
            fixtures::generate_long_table(5000).unwrap(),
            &DocumentInfo::new("big.xlsx"),
        )
        .unwrap();

    let sheet = &result.sheets[0];
    assert!(sheet.truncated);
    assert!(sheet.html.contains("class=\"warning-text\""));

    // Semantic summary is capped at 50 lines
    assert_eq!(result.combined.matches("source:Big | row:").count(), 50);
    assert!(result.combined.contains("source:Big | row:51 | Id:50 , Label:item-50"));

    // Preview is capped at 3000 data rows
    let start = sheet.html.find("data-preview=\"").unwrap() + "data-preview=\"".len();
    let end = start + sheet.html[start..].find('"').unwrap();
    let table = PreviewEncoder::decode(&sheet.html[start..end]).unwrap();
    assert_eq!(table.matches("<tr>").count(), 3001);
    assert!(table.contains("<td>item-3000</td>"));
    assert!(!table.contains("<td>item-3001</td>"));

    // Markdown snapshot is capped at 1000 rows
    assert!(sheet.html.contains("| 1000 | item-1000 |"));
    assert!(!sheet.html.contains("| 1001 |"));
}

#[test]
fn test_exactly_at_preview_cap_is_not_truncated() {
    let processor = ProcessorBuilder::new()
        .with_max_preview_rows(20)
        .build()
        .unwrap();
    let exact = processor
        .process_bytes(fixtures::generate_long_table(20).unwrap(), &DocumentInfo::new("a.xlsx"))
        .unwrap();
    assert!(!exact.sheets[0].truncated);

    let over = processor
        .process_bytes(fixtures::generate_long_table(21).unwrap(), &DocumentInfo::new("b.xlsx"))
        .unwrap();
    assert!(over.sheets[0].truncated);
    assert!(over.sheets[0].html.contains("only the first 20 rows"));
}

#[test]
fn test_header_only_sheet_is_omitted() {
    let processor = ProcessorBuilder::new().build().unwrap();
    let result = processor
        .process_bytes(fixtures::generate_header_only().unwrap(), &DocumentInfo::new("h.xlsx"))
        .unwrap();
    assert!(result.sheets.is_empty());
    assert!(result.combined.contains(PLACEHOLDER));
}

#[test]
fn test_single_row_uses_column_letters() {
    let processor = ProcessorBuilder::new().build().unwrap();
    let result = processor
        .process_bytes(fixtures::generate_single_row().unwrap(), &DocumentInfo::new("r.xlsx"))
        .unwrap();
    assert!(result.combined.contains("source:Sheet1 | row:1 | B:only , C:row"));
}

#[test]
fn test_very_long_cell_content() {
    let processor = ProcessorBuilder::new().build().unwrap();
    let result = processor
        .process_bytes(fixtures::generate_long_cell().unwrap(), &DocumentInfo::new("long.xlsx"))
        .unwrap();

    let long = "あ".repeat(32_000);
    assert!(result.combined.contains(&format!("Text:{}", long)));
}

#[test]
fn test_corrupted_file() {
    let processor = ProcessorBuilder::new().build().unwrap();
    let result = processor.process(
        Cursor::new(fixtures::generate_corrupted_file()),
        &DocumentInfo::new("bad.xlsx"),
    );

    match result {
        Err(XlsxDualError::Parse(_)) | Err(XlsxDualError::Io(_)) => {}
        other => panic!("Expected Parse or Io error for corrupted file, got {:?}", other.map(|r| r.filename)),
    }
}

#[test]
fn test_invalid_structure() {
    let processor = ProcessorBuilder::new().build().unwrap();
    let result = processor.process_bytes(
        fixtures::generate_invalid_structure(),
        &DocumentInfo::new("bad.xlsx"),
    );

    match result {
        Err(XlsxDualError::Zip(_)) | Err(XlsxDualError::Parse(_)) => {}
        other => panic!("Expected Zip or Parse error, got {:?}", other.map(|r| r.filename)),
    }
}

#[test]
fn test_input_size_limit() {
    let processor = ProcessorBuilder::new()
        .with_max_input_file_size(64)
        .build()
        .unwrap();
    let result = processor.process_bytes(
        fixtures::generate_long_table(10).unwrap(),
        &DocumentInfo::new("limited.xlsx"),
    );
    assert!(matches!(result, Err(XlsxDualError::SecurityViolation(_))));
}
