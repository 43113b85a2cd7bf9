//! Output Format Module
//!
//! 正規化済みテーブルの描画（Markdown / HTML）と、テキストのエスケープ処理を提供するモジュール。

mod formatters;

pub(crate) use formatters::{HtmlFormatter, MarkdownFormatter};

/// HTMLの本文・属性値として安全な文字列にエスケープする
pub(crate) fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Markdown特殊文字をエスケープ
pub(crate) fn escape_markdown(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('|', "\\|")
        .replace("\r\n", "<br>")
        .replace('\n', "<br>")
}
