//! Public API Types
//!
//! ワークブックデコーダーと正規化処理の境界で使用する公開型を定義するモジュール。

use serde::{Deserialize, Serialize};

/// セルの値を表す列挙型
///
/// ソースグリッドの動的な値（数値・文字列・空）を閉じた値モデルとして表現します。
/// 表示文字列への変換は正規化の境界でのみ行います。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// 空セル
    Empty,

    /// 文字列
    Text(String),

    /// 数値
    Number(f64),
}

impl CellValue {
    /// 値が空（`Empty`または空文字列）かどうかを判定
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// 表示文字列に変換する。空の場合は`None`
    ///
    /// 数値は`f64`の最短表現で出力します（`30.0` → `"30"`）。
    pub fn display(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) if s.is_empty() => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => Some(n.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// ヘッダーを仮定しない生のシート
///
/// シート名と、A1を起点とする行の順序付きグリッドを保持します。
/// 行ごとの長さは揃っていなくてもよく、不足分は空セルとして扱います。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSheet {
    /// シート名
    pub name: String,

    /// セルグリッド（行 × 列）
    pub rows: Vec<Vec<CellValue>>,
}

impl RawSheet {
    /// 新しいシートを生成
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// 文字列グリッドからシートを生成する（空文字列は空セル）
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use xlsxdual::RawSheet;
    ///
    /// let sheet = RawSheet::from_strings("Sheet1", &[&["Name", "Age"], &["Alice", "30"]]);
    /// assert_eq!(sheet.width(), 2);
    /// ```
    pub fn from_strings(name: impl Into<String>, rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|s| {
                        if s.is_empty() {
                            CellValue::Empty
                        } else {
                            CellValue::from(*s)
                        }
                    })
                    .collect()
            })
            .collect();
        Self::new(name, rows)
    }

    /// グリッドの列数（最長の行の長さ）
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// 指定セルの値を取得（範囲外は空セル）
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(EMPTY)
    }
}
