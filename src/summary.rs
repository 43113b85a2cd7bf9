//! Summary Module
//!
//! 正規化済みテーブルの各行を、出自（シート名・行番号）付きのテキスト行に変換する。
//! 下流で任意に切り出されても、各行が単独でシートと行に帰属できることが目的です。

use crate::types::{NormalizedTable, SemanticLine};

/// ペア同士の区切り
const PAIR_SEPARATOR: &str = " , ";

/// 意味要約ビルダー
#[derive(Debug, Clone, Copy)]
pub struct SemanticSummaryBuilder {
    max_rows: usize,
}

impl Default for SemanticSummaryBuilder {
    fn default() -> Self {
        Self::new(50)
    }
}

impl SemanticSummaryBuilder {
    /// 先頭`max_rows`行を要約するビルダーを生成
    pub fn new(max_rows: usize) -> Self {
        Self { max_rows }
    }

    /// 要約行を生成する
    ///
    /// 値をtrimして空でないセルだけを`label:value`として並べます。
    /// セル内改行は空白に置き換えるため、1行のデータは常に1行のテキストになります。
    /// すべて空の行は行を生成しません。
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use xlsxdual::{RawSheet, SemanticSummaryBuilder, TableNormalizer};
    ///
    /// let sheet = RawSheet::from_strings("Sheet1", &[&["Name", "Age"], &["Alice", "30"]]);
    /// let table = TableNormalizer::normalize(&sheet).unwrap();
    /// let lines = SemanticSummaryBuilder::default().build(&table, "Sheet1");
    /// assert_eq!(lines[0].text, "source:Sheet1 | row:2 | Name:Alice , Age:30");
    /// ```
    pub fn build(&self, table: &NormalizedTable, sheet_name: &str) -> Vec<SemanticLine> {
        table
            .rows
            .iter()
            .take(self.max_rows)
            .filter_map(|row| {
                let pairs: Vec<String> = table
                    .pairs(row)
                    .filter_map(|(label, value)| {
                        let value = value.trim();
                        (!value.is_empty()).then(|| {
                            format!("{}:{}", single_line(label), single_line(value))
                        })
                    })
                    .collect();

                if pairs.is_empty() {
                    return None;
                }

                Some(SemanticLine {
                    sheet_name: sheet_name.to_string(),
                    row_number: row.row_number(),
                    text: format!(
                        "source:{} | row:{} | {}",
                        sheet_name,
                        row.row_number(),
                        pairs.join(PAIR_SEPARATOR)
                    ),
                })
            })
            .collect()
    }

    /// 要約行をMarkdownの節としてまとめる。行がなければ空文字列
    pub fn render_section(lines: &[SemanticLine], sheet_name: &str) -> String {
        if lines.is_empty() {
            return String::new();
        }

        let mut section = format!("### {} - semantic summary\n", sheet_name);
        for line in lines {
            section.push_str(&line.text);
            section.push('\n');
        }
        section
    }
}

/// 改行（`\r\n` / `\n` / `\r`）を空白1つに置き換える
fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\r', '\n'], " ")
}
