//! Preview Module
//!
//! ブラウザ表示用のHTMLテーブルを描画し、不透明なテキストとしてエンコードする。
//!
//! エンコードはHTMLのUTF-8バイト列に対する標準Base64です。デコードはドキュメントに
//! 埋め込まれたクライアントスクリプトが`atob` → `Uint8Array` → `TextDecoder("utf-8")`の
//! 順で行い、両側で同じUTF-8バイト列を扱います。

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::XlsxDualError;
use crate::output::HtmlFormatter;
use crate::types::NormalizedTable;

/// エンコード済みプレビュー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPreview {
    /// Base64テキスト（属性値にそのまま埋め込める文字のみ）
    pub blob: String,

    /// テーブルが行数上限を超えていたか
    pub truncated: bool,

    /// 描画した行数
    pub rendered_rows: usize,
}

/// プレビューエンコーダー
#[derive(Debug, Clone, Copy)]
pub struct PreviewEncoder {
    max_rows: usize,
}

impl Default for PreviewEncoder {
    fn default() -> Self {
        Self::new(3000)
    }
}

impl PreviewEncoder {
    /// 先頭`max_rows`行を描画するエンコーダーを生成
    pub fn new(max_rows: usize) -> Self {
        Self { max_rows }
    }

    /// テーブルを描画してエンコードする
    pub fn encode(&self, table: &NormalizedTable) -> Result<EncodedPreview, XlsxDualError> {
        let html = HtmlFormatter::render(table, self.max_rows)?;
        Ok(EncodedPreview {
            blob: Self::encode_markup(&html),
            truncated: table.len() > self.max_rows,
            rendered_rows: table.len().min(self.max_rows),
        })
    }

    /// マークアップのUTF-8バイト列をBase64にする
    pub fn encode_markup(markup: &str) -> String {
        STANDARD.encode(markup.as_bytes())
    }

    /// クライアントスクリプトと同じ手順でデコードする
    ///
    /// 処理パイプライン自体は使用しません。出力を検証する利用者とテスト向けです。
    ///
    /// ```rust
    /// use xlsxdual::PreviewEncoder;
    ///
    /// let blob = PreviewEncoder::encode_markup("<td>売上 €</td>");
    /// assert_eq!(PreviewEncoder::decode(&blob).unwrap(), "<td>売上 €</td>");
    /// ```
    pub fn decode(blob: &str) -> Result<String, XlsxDualError> {
        let bytes = STANDARD.decode(blob)?;
        let text = std::str::from_utf8(&bytes)?;
        Ok(text.to_string())
    }
}
