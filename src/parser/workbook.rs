//! Workbook Reader
//!
//! calamineのワークブックを開き、宣言順に`RawSheet`を生成する。

use std::io::{Cursor, Read};

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use tracing::debug;

use crate::api::{CellValue, RawSheet};
use crate::error::XlsxDualError;
use crate::formatter::CellFormatter;
use crate::security::SecurityConfig;

/// ワークブックリーダー
///
/// 入力全体をメモリに読み込み、セキュリティ検査を通過した場合のみデコードします。
#[derive(Debug)]
pub(crate) struct WorkbookReader {
    security: SecurityConfig,
    formatter: CellFormatter,
}

impl WorkbookReader {
    /// 入力サイズ上限を指定してリーダーを生成
    pub fn new(max_input_file_size: u64) -> Self {
        Self {
            security: SecurityConfig::with_max_input_file_size(max_input_file_size),
            formatter: CellFormatter::new(),
        }
    }

    /// リーダーから全シートを読み込む
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<RawSheet>)` - ワークブックの宣言順に並んだシート
    /// * `Err(XlsxDualError)` - 入力を読めない、セキュリティ制限に違反した、
    ///   またはワークブックとして解析できなかった場合
    pub fn read<R: Read>(&self, mut input: R) -> Result<Vec<RawSheet>, XlsxDualError> {
        let mut buffer = Vec::new();
        input.read_to_end(&mut buffer)?;
        self.read_bytes(buffer)
    }

    /// バイト列から全シートを読み込む
    pub fn read_bytes(&self, bytes: Vec<u8>) -> Result<Vec<RawSheet>, XlsxDualError> {
        self.security.inspect(&bytes)?;

        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
        let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
        debug!(sheets = sheet_names.len(), "workbook opened");

        let mut sheets = Vec::with_capacity(sheet_names.len());
        for name in &sheet_names {
            let range = workbook.worksheet_range(name)?;
            sheets.push(self.to_raw_sheet(name, &range));
        }
        Ok(sheets)
    }

    /// セル範囲をA1起点のグリッドに変換する
    ///
    /// calamineは先頭の空行・空列を範囲から除くため、その分を空セルで補います。
    fn to_raw_sheet(&self, name: &str, range: &Range<Data>) -> RawSheet {
        let (row_offset, col_offset) = range
            .start()
            .map(|(row, col)| (row as usize, col as usize))
            .unwrap_or((0, 0));

        let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); row_offset];
        for row in range.rows() {
            let mut cells = vec![CellValue::Empty; col_offset];
            cells.extend(row.iter().map(|cell| {
                self.formatter.convert(cell).unwrap_or_else(|err| {
                    debug!(sheet = name, error = %err, "cell kept as raw text");
                    CellValue::Text(cell.to_string())
                })
            }));
            rows.push(cells);
        }

        RawSheet::new(name, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader() -> WorkbookReader {
        WorkbookReader::new(2_147_483_648)
    }

    #[test]
    fn test_range_is_anchored_at_a1() {
        let mut range: Range<Data> = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("Name".to_string()));
        range.set_value((2, 2), Data::String("Age".to_string()));
        range.set_value((3, 1), Data::String("Alice".to_string()));
        range.set_value((3, 2), Data::Int(30));

        let sheet = reader().to_raw_sheet("Offset", &range);
        assert_eq!(sheet.rows.len(), 4);
        assert!(sheet.rows[0].is_empty());
        assert_eq!(sheet.cell(2, 0), &CellValue::Empty);
        assert_eq!(sheet.cell(2, 1), &CellValue::Text("Name".to_string()));
        assert_eq!(sheet.cell(3, 2), &CellValue::Number(30.0));
    }

    #[test]
    fn test_empty_range() {
        let range: Range<Data> = Range::empty();
        let sheet = reader().to_raw_sheet("Empty", &range);
        assert!(sheet.rows.is_empty());
    }

    #[test]
    fn test_invalid_bytes_are_parse_errors() {
        let result = reader().read_bytes(b"definitely not a workbook".to_vec());
        assert!(matches!(result, Err(XlsxDualError::Parse(_))));
    }
}
