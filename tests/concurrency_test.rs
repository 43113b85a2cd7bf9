//! Concurrency Tests for xlsxdual
//!
//! Output must not depend on the pool size or on which worker finishes first.

use rust_xlsxwriter::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use xlsxdual::{DocumentInfo, ProcessorBuilder, RawSheet};

mod fixtures {
    use super::*;

    /// `count` sheets of uneven size, so workers finish out of order
    pub fn generate_uneven_workbook(count: usize) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        for idx in 0..count {
            let sheet = workbook.add_worksheet();
            sheet.set_name(format!("S{:02}", count - idx))?;
            sheet.write_string(0, 0, "Key")?;
            sheet.write_string(0, 1, "Value")?;
            let rows = if idx % 2 == 0 { 400 } else { 3 };
            for row in 1..=rows {
                sheet.write_string(row, 0, &format!("k{}-{}", idx, row))?;
                sheet.write_number(row, 1, (idx as u32 * 1000 + row) as f64)?;
            }
        }
        Ok(workbook.save_to_buffer()?)
    }
}

#[test]
fn test_pool_size_does_not_change_output() {
    let bytes = fixtures::generate_uneven_workbook(12).unwrap();
    let info = DocumentInfo::new("uneven.xlsx").with_focus_sheet("S05");

    let wide = ProcessorBuilder::new()
        .with_worker_count(4)
        .with_anchor_seed(2024)
        .build()
        .unwrap()
        .process_bytes(bytes.clone(), &info)
        .unwrap();
    let serial = ProcessorBuilder::new()
        .with_worker_count(1)
        .with_anchor_seed(2024)
        .build()
        .unwrap()
        .process_bytes(bytes, &info)
        .unwrap();

    assert_eq!(wide, serial);

    // Declared order, not completion order
    let expected: Vec<String> = (0..12).map(|idx| format!("S{:02}", 12 - idx)).collect();
    assert_eq!(wide.sheet_names(), expected);
}

#[test]
fn test_anchor_order_matches_document_order() {
    let bytes = fixtures::generate_uneven_workbook(8).unwrap();
    let processor = ProcessorBuilder::new().with_worker_count(3).build().unwrap();
    let result = processor
        .process_bytes(bytes, &DocumentInfo::new("order.xlsx"))
        .unwrap();

    let mut last = 0;
    for entry in &result.anchors {
        let marker = format!("class=\"sheet-container\" id=\"{}\"", entry.anchor);
        let pos = result.combined.find(&marker).unwrap();
        assert!(pos > last, "{} is out of order", entry.sheet_name);
        last = pos;
    }
}

#[test]
fn test_duplicate_sheet_names_get_unique_anchors() {
    let sheets: Vec<RawSheet> = (0..64)
        .map(|i| {
            let value = i.to_string();
            RawSheet::from_strings("Data", &[&["Id"], &[value.as_str()]])
        })
        .collect();

    let processor = ProcessorBuilder::new().with_worker_count(8).build().unwrap();
    let result = processor.process_sheets(&sheets, &DocumentInfo::new("dupes.xlsx"));

    assert_eq!(result.sheets.len(), 64);
    let unique: HashSet<&str> = result.anchors.iter().map(|e| e.anchor.as_str()).collect();
    assert_eq!(unique.len(), 64);

    // Each fragment keeps its own rows
    for (i, sheet) in result.sheets.iter().enumerate() {
        assert!(sheet.html.contains(&format!("source:Data | row:2 | Id:{}", i)));
    }
}

#[test]
fn test_shared_processor_across_threads() {
    let processor = Arc::new(
        ProcessorBuilder::new()
            .with_worker_count(2)
            .with_anchor_seed(5)
            .build()
            .unwrap(),
    );
    let bytes = Arc::new(fixtures::generate_uneven_workbook(5).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let processor = Arc::clone(&processor);
            let bytes = Arc::clone(&bytes);
            thread::spawn(move || {
                processor
                    .process_bytes(bytes.as_ref().clone(), &DocumentInfo::new("shared.xlsx"))
                    .unwrap()
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for result in &results[1..] {
        assert_eq!(result, &results[0]);
    }
}
