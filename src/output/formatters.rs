//! Output Formatters Implementation
//!
//! 各出力フォーマットの実装を提供するモジュール。

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;
use unicode_width::UnicodeWidthStr;

use super::{escape_html, escape_markdown};
use crate::error::XlsxDualError;
use crate::types::NormalizedTable;

/// タグに付いたインライン書式属性（` style="…"` / ` class="…"`）
static PRESENTATION_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#" (?:style|class)="[^"]*""#).expect("presentation attribute pattern is valid")
});

/// Markdown形式のフォーマッター
///
/// 列ラベルをヘッダー行とするパイプテーブルを出力します。
/// 列幅は表示幅（全角文字は2）で揃え、最小幅は3文字です。
pub(crate) struct MarkdownFormatter;

impl MarkdownFormatter {
    /// 先頭`max_rows`行をMarkdownテーブルとして描画する
    pub fn render(table: &NormalizedTable, max_rows: usize) -> Result<String, XlsxDualError> {
        if table.width() == 0 {
            return Ok(String::new());
        }

        let header: Vec<String> = table.columns.iter().map(|c| escape_markdown(c.trim())).collect();
        let body: Vec<Vec<String>> = table
            .rows
            .iter()
            .take(max_rows)
            .map(|row| row.cells.iter().map(|c| escape_markdown(c.trim())).collect())
            .collect();

        let widths = Self::calculate_column_widths(&header, &body);
        let mut out = String::new();

        Self::write_row(&mut out, &header, &widths)?;
        Self::write_separator(&mut out, &widths)?;
        for row in &body {
            Self::write_row(&mut out, row, &widths)?;
        }

        Ok(out)
    }

    /// 列幅を計算（内部ヘルパー）
    fn calculate_column_widths(header: &[String], body: &[Vec<String>]) -> Vec<usize> {
        let mut widths: Vec<usize> = header.iter().map(|h| h.width().max(3)).collect();
        for row in body {
            for (col, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(col) {
                    *width = (*width).max(cell.width());
                }
            }
        }
        widths
    }

    fn write_row(out: &mut String, cells: &[String], widths: &[usize]) -> Result<(), XlsxDualError> {
        out.push('|');
        for (col, width) in widths.iter().enumerate() {
            let content = cells.get(col).map(String::as_str).unwrap_or_default();
            let padding = width.saturating_sub(content.width());
            write!(out, " {}{} |", content, " ".repeat(padding))?;
        }
        out.push('\n');
        Ok(())
    }

    /// ヘッダー区切り行（セル前後のスペース分を含む）
    fn write_separator(out: &mut String, widths: &[usize]) -> Result<(), XlsxDualError> {
        out.push('|');
        for width in widths {
            write!(out, "{}|", "-".repeat(width + 2))?;
        }
        out.push('\n');
        Ok(())
    }
}

/// HTML形式のフォーマッター
///
/// 書式付きのテーブルを描画した後、インラインの`style`/`class`属性をすべて除去します。
/// プレビューはドキュメント共有のスタイルシートを継承します。
pub(crate) struct HtmlFormatter;

impl HtmlFormatter {
    /// 先頭`max_rows`行をHTMLテーブルとして描画する
    pub fn render(table: &NormalizedTable, max_rows: usize) -> Result<String, XlsxDualError> {
        let styled = Self::render_styled(table, max_rows)?;
        Ok(Self::strip_presentation(&styled))
    }

    fn render_styled(table: &NormalizedTable, max_rows: usize) -> Result<String, XlsxDualError> {
        let mut out = String::new();
        writeln!(out, "<table border=\"0\" class=\"dataframe\">")?;
        writeln!(out, "  <thead>")?;
        writeln!(out, "    <tr style=\"text-align: right;\">")?;
        for label in &table.columns {
            writeln!(out, "      <th>{}</th>", escape_html(label))?;
        }
        writeln!(out, "    </tr>")?;
        writeln!(out, "  </thead>")?;
        writeln!(out, "  <tbody>")?;
        for row in table.rows.iter().take(max_rows) {
            writeln!(out, "    <tr>")?;
            for cell in &row.cells {
                writeln!(out, "      <td>{}</td>", escape_html(cell))?;
            }
            writeln!(out, "    </tr>")?;
        }
        writeln!(out, "  </tbody>")?;
        write!(out, "</table>")?;
        Ok(out)
    }

    /// インラインの`style`/`class`属性を除去する
    ///
    /// セル本文はエスケープ済みのため、引用符付き属性はタグ内にしか現れません。
    pub fn strip_presentation(html: &str) -> String {
        PRESENTATION_ATTR.replace_all(html, "").into_owned()
    }
}
