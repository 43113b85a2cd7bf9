//! Types Module
//!
//! パイプラインの各段が受け渡す共通データ型を定義するモジュール。
//! 各段は入力を所有して出力に変換し、次の段に渡した値を変更しません。

use serde::Serialize;

/// ヘッダー解決の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HeaderMode {
    /// 1行しか残らなかったため、列位置（A, B, ...）をラベルにした
    Positional,

    /// 先頭行をそのままヘッダーとして使用した
    SingleRow,

    /// 先頭2行を結合してヘッダーにした（先頭行はセクション見出し）
    TwoRow,
}

/// 正規化済みテーブルの1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    /// 元グリッド上の行インデックス（0始まり）
    pub source_row: usize,

    /// 列ラベルと同じ順序の表示文字列（空は`""`）
    pub cells: Vec<String>,
}

impl NormalizedRow {
    /// 元シート上の行番号（1始まり）
    pub fn row_number(&self) -> usize {
        self.source_row + 1
    }
}

/// ヘッダー解決と結合セル補完を終えたテーブル
///
/// 列ラベルは一意である必要はありません。すべてのセルは非null文字列です。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTable {
    /// 列ラベル
    pub columns: Vec<String>,

    /// データ行
    pub rows: Vec<NormalizedRow>,

    /// ヘッダー解決の方式
    pub header_mode: HeaderMode,
}

impl NormalizedTable {
    /// データ行数
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// データ行が存在しないかどうか
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 列数
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// 指定行の（ラベル, 値）ペアを列順に返す
    pub fn pairs<'a>(&'a self, row: &'a NormalizedRow) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(row.cells.iter().map(String::as_str))
    }
}

/// 意味要約の1行（シート名と行番号の出自付き）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemanticLine {
    /// ソースシート名
    pub sheet_name: String,

    /// 元シート上の行番号（1始まり）
    pub row_number: usize,

    /// `source:<sheet> | row:<n> | label:value , ...` 形式の本文
    pub text: String,
}

impl std::fmt::Display for SemanticLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// 1シート分の自己完結したフラグメント
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetFragment {
    /// シート名
    pub sheet_name: String,

    /// ドキュメント内で一意なアンカーID
    pub anchor: String,

    /// 視覚的には表示されない意味ブロック（HTMLエスケープ済み）
    pub semantic_block: String,

    /// クライアント側でデコードされるプレビュー（Base64）
    pub encoded_preview: String,

    /// プレビューが行数上限で切り詰められたか
    pub truncated: bool,

    /// フラグメント全体のマークアップ
    pub markup: String,

    /// インラインエラーフラグメントかどうか
    pub failed: bool,
}

/// シート名とアンカーIDの対応
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnchorEntry {
    /// シート名
    pub sheet_name: String,

    /// アンカーID
    pub anchor: String,
}

/// 目次の1項目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// リンク先アンカー
    pub anchor: String,

    /// 表示名（シート名）
    pub sheet_name: String,
}

/// 組み立て済みドキュメント
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentArtifact {
    /// 目次（本文と同じ順序）
    pub toc: Vec<TocEntry>,

    /// フラグメントを連結した本文
    pub body: String,

    /// 共有シェルで包んだ完全なHTML
    pub html: String,
}

/// 出力レコード内のシート項目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetOutput {
    pub name: String,
    pub anchor: String,
    pub html: String,
    pub truncated: bool,
    pub failed: bool,
}

/// ワークブック1件の処理結果
///
/// シート名が重複しても失われないよう、シートとアンカーは順序付きリストで保持します。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedWorkbook {
    /// 表示用ファイル名
    pub filename: String,

    /// シートごとのフラグメント（ワークブックの宣言順）
    pub sheets: Vec<SheetOutput>,

    /// アンカーマップ（ワークブックの宣言順）
    pub anchors: Vec<AnchorEntry>,

    /// 組み立て済みドキュメント
    pub combined: String,
}

impl ProcessedWorkbook {
    /// JSON文字列に直列化する
    pub fn to_json(&self) -> Result<String, crate::XlsxDualError> {
        Ok(serde_json::to_string(self)?)
    }

    /// アンカーIDからシート項目を取得
    pub fn fragment_by_anchor(&self, anchor: &str) -> Option<&SheetOutput> {
        self.sheets.iter().find(|s| s.anchor == anchor)
    }

    /// （シート名, アンカー）の組を宣言順に返す
    pub fn anchor_map(&self) -> Vec<(&str, &str)> {
        self.anchors
            .iter()
            .map(|e| (e.sheet_name.as_str(), e.anchor.as_str()))
            .collect()
    }

    /// 出力に含まれるシート名を宣言順に返す
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

/// 列インデックスを列名に変換（0 -> "A", 25 -> "Z", 26 -> "AA"）
pub(crate) fn column_letter(mut col: usize) -> String {
    let mut result = String::new();
    loop {
        let remainder = col % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    result
}
