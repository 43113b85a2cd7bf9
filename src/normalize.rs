//! Normalize Module
//!
//! 生のセルグリッドを、ヘッダー解決済みのクリーンなテーブルに修復するモジュール。
//!
//! 処理は次の順に行います。
//!
//! 1. 全空の行・列を除去する
//! 2. ヘッダーを推定する（単一行ヘッダー / 2行結合ヘッダー）
//! 3. 先頭2列の空セルを上の値で埋める（縦方向の結合セル補完）
//! 4. 残った空セルを空文字列にする

use tracing::debug;

use crate::api::RawSheet;
use crate::types::{column_letter, HeaderMode, NormalizedRow, NormalizedTable};

/// 先頭行の空セル率がこの値未満なら単一行ヘッダーとみなす
const SPARSE_HEADER_RATIO: f64 = 0.5;

/// 下方向フィルを適用する先頭列数
const FILL_DOWN_COLUMNS: usize = 2;

/// 全空の行・列を除去した結果（元グリッド上のインデックス）
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TrimmedGrid {
    pub rows: Vec<usize>,
    pub columns: Vec<usize>,
}

impl TrimmedGrid {
    fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }
}

/// 作業用の行（`None`は空セル）
#[derive(Debug)]
struct WorkRow {
    source_row: usize,
    cells: Vec<Option<String>>,
}

/// テーブル正規化器
///
/// 正規化は失敗しません。入力が全空の場合のみ`None`を返し、
/// 呼び出し側はそのシートを黙って省略します。
#[derive(Debug, Clone, Copy, Default)]
pub struct TableNormalizer;

impl TableNormalizer {
    /// 生のシートを正規化する
    ///
    /// # 戻り値
    ///
    /// * `Some(NormalizedTable)` - データ行が1行以上残った場合
    /// * `None` - 全空のシート、またはヘッダー以外の行が残らなかった場合
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use xlsxdual::{HeaderMode, RawSheet, TableNormalizer};
    ///
    /// let sheet = RawSheet::from_strings("Sheet1", &[&["Name", "Age"], &["Alice", "30"]]);
    /// let table = TableNormalizer::normalize(&sheet).unwrap();
    /// assert_eq!(table.header_mode, HeaderMode::SingleRow);
    /// assert_eq!(table.columns, vec!["Name", "Age"]);
    /// ```
    pub fn normalize(sheet: &RawSheet) -> Option<NormalizedTable> {
        let trimmed = Self::trim(sheet);
        if trimmed.is_empty() {
            debug!(sheet = %sheet.name, "sheet is empty after trimming");
            return None;
        }

        let mut grid: Vec<WorkRow> = trimmed
            .rows
            .iter()
            .map(|&row| WorkRow {
                source_row: row,
                cells: trimmed
                    .columns
                    .iter()
                    .map(|&col| sheet.cell(row, col).display())
                    .collect(),
            })
            .collect();

        let (columns, header_mode) = Self::resolve_header(&mut grid, &trimmed.columns);
        Self::fill_down(&mut grid, columns.len());

        let rows: Vec<NormalizedRow> = grid
            .into_iter()
            .map(|row| NormalizedRow {
                source_row: row.source_row,
                cells: row
                    .cells
                    .into_iter()
                    .map(Option::unwrap_or_default)
                    .collect(),
            })
            .collect();

        debug!(
            sheet = %sheet.name,
            ?header_mode,
            rows = rows.len(),
            columns = columns.len(),
            "sheet normalized"
        );

        if rows.is_empty() {
            return None;
        }

        Some(NormalizedTable {
            columns,
            rows,
            header_mode,
        })
    }

    /// 全空の行と列を除去する
    ///
    /// 空の判定は`CellValue::is_blank`に従います。
    /// 結果に対してもう一度適用しても何も変わりません。
    pub(crate) fn trim(sheet: &RawSheet) -> TrimmedGrid {
        let rows: Vec<usize> = sheet
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().any(|cell| !cell.is_blank()))
            .map(|(idx, _)| idx)
            .collect();

        let columns: Vec<usize> = (0..sheet.width())
            .filter(|&col| rows.iter().any(|&row| !sheet.cell(row, col).is_blank()))
            .collect();

        TrimmedGrid { rows, columns }
    }

    /// 2行結合ヘッダーのラベル規則
    ///
    /// 両方が空でなく異なる場合は`h0_h1`、それ以外は`h1`を優先し、なければ`h0`。
    ///
    /// ```rust
    /// use xlsxdual::TableNormalizer;
    ///
    /// assert_eq!(TableNormalizer::merge_header_labels("Region", "Q1"), "Region_Q1");
    /// assert_eq!(TableNormalizer::merge_header_labels("Region", "Region"), "Region");
    /// assert_eq!(TableNormalizer::merge_header_labels("", "Q1"), "Q1");
    /// assert_eq!(TableNormalizer::merge_header_labels("Region", ""), "Region");
    /// ```
    pub fn merge_header_labels(h0: &str, h1: &str) -> String {
        match (h0.is_empty(), h1.is_empty()) {
            (false, false) if h0 != h1 => format!("{}_{}", h0, h1),
            (_, false) => h1.to_string(),
            (false, true) => h0.to_string(),
            (true, true) => String::new(),
        }
    }

    /// ヘッダーを解決し、ヘッダー行をグリッドから取り除く
    fn resolve_header(grid: &mut Vec<WorkRow>, source_columns: &[usize]) -> (Vec<String>, HeaderMode) {
        if grid.len() <= 1 {
            let labels = source_columns.iter().map(|&col| column_letter(col)).collect();
            return (labels, HeaderMode::Positional);
        }

        if Self::blank_ratio(&grid[0].cells) < SPARSE_HEADER_RATIO {
            let header = grid.remove(0);
            let labels = header
                .cells
                .into_iter()
                .map(Option::unwrap_or_default)
                .collect();
            return (labels, HeaderMode::SingleRow);
        }

        // 疎な先頭行はセクション見出しとして、その下の行と結合する
        let body = grid.split_off(2);
        let header = std::mem::replace(grid, body);
        let section = Self::forward_fill_row(&header[0].cells);
        let labels = section
            .iter()
            .zip(header[1].cells.iter())
            .map(|(h0, h1)| {
                Self::merge_header_labels(
                    h0.as_deref().unwrap_or_default(),
                    h1.as_deref().unwrap_or_default(),
                )
            })
            .collect();

        (labels, HeaderMode::TwoRow)
    }

    /// 空セルの割合
    fn blank_ratio(cells: &[Option<String>]) -> f64 {
        if cells.is_empty() {
            return 1.0;
        }
        let blanks = cells.iter().filter(|cell| cell.is_none()).count();
        blanks as f64 / cells.len() as f64
    }

    /// 行内で左から右へ空セルを直前の値で埋める
    fn forward_fill_row(cells: &[Option<String>]) -> Vec<Option<String>> {
        let mut last: Option<String> = None;
        cells
            .iter()
            .map(|cell| {
                if cell.is_some() {
                    last = cell.clone();
                }
                last.clone()
            })
            .collect()
    }

    /// 先頭2列（位置基準）の空セルを直前の非空値で埋める
    fn fill_down(grid: &mut [WorkRow], width: usize) {
        for col in 0..width.min(FILL_DOWN_COLUMNS) {
            let mut last: Option<String> = None;
            for row in grid.iter_mut() {
                if let Some(cell) = row.cells.get_mut(col) {
                    if cell.is_none() {
                        *cell = last.clone();
                    } else {
                        last = cell.clone();
                    }
                }
            }
        }
    }
}
