//! Assembler Module
//!
//! シートフラグメントを目次付きの1つのHTMLドキュメントにまとめる。
//!
//! ドキュメントシェルは1つだけで、文字コード宣言・スタイルシート・スクリプトを
//! それぞれ1回だけ含みます。フラグメント側はこれらを一切持ちません。

use tracing::{debug, instrument};

use crate::dispatch::DispatchOutcome;
use crate::output::escape_html;
use crate::types::{DocumentArtifact, TocEntry};

/// フラグメント間の区切り
const SEPARATOR: &str = "\n<hr class=\"sheet-separator\">\n";

/// 表示対象がない場合の本文
const EMPTY_NOTICE: &str = "<h3 class=\"empty-notice\">Empty file or nothing to display</h3>";

/// 共有スタイルシート
const STYLESHEET: &str = r##"
    body { font-family: -apple-system, "Segoe UI", "Hiragino Sans", "Microsoft YaHei", sans-serif; padding: 20px; background-color: #f8fafc; color: #334155; }

    .file-toc { background: #fff; padding: 15px 20px; border-radius: 8px; border: 1px solid #cbd5e1; margin-bottom: 30px; box-shadow: 0 2px 4px rgba(0,0,0,0.05); }
    .file-toc h3 { margin-top: 0; font-size: 16px; color: #1e293b; border-bottom: 1px solid #e2e8f0; padding-bottom: 10px; }
    .file-toc ul { padding-left: 20px; margin-bottom: 0; }
    .file-toc li { margin-bottom: 4px; }
    .file-toc a { text-decoration: none; color: #2563eb; }

    .sheet-container { background: #fff; padding: 20px; border-radius: 8px; box-shadow: 0 1px 3px rgba(0,0,0,0.1); margin-bottom: 30px; scroll-margin-top: 20px; transition: box-shadow 0.3s; }
    .sheet-container:target, .anchor-active { box-shadow: 0 0 0 3px #2563eb; }
    .sheet-title { border-left: 4px solid #2563eb; padding-left: 12px; margin-top: 0; font-size: 18px; color: #0f172a; }
    .sheet-separator { border: 0; border-top: 2px dashed #cbd5e1; margin: 40px 0; }
    .sheet-error { background: #fef2f2; border: 1px solid #fecaca; color: #b91c1c; padding: 12px 16px; border-radius: 8px; }
    .warning-text { color: #ef4444; font-size: 12px; }
    .source-link { font-size: 12px; margin-bottom: 0; }
    .empty-notice { color: #64748b; }

    table { border-collapse: collapse; width: 100%; margin-top: 15px; font-size: 13px; }
    th, td { border: 1px solid #e2e8f0; padding: 8px 12px; text-align: left; }
    th { background-color: #f1f5f9; font-weight: 600; color: #334155; position: sticky; top: 0; z-index: 10; }
    tr:nth-child(even) { background-color: #f8fafc; }
    tr:hover { background-color: #eff6ff; }

    .loading-box { padding: 20px; text-align: center; color: #64748b; background: #f1f5f9; border-radius: 4px; font-size: 13px; }
    .decode-error { color: #ef4444; }
"##;

/// 共有スクリプト
///
/// プレビューはBase64 → バイト列 → UTF-8の順で1回だけデコードする。
const SCRIPT: &str = r##"
(function () {
    function decodePreview(blob) {
        var binary = window.atob(blob);
        var bytes = new Uint8Array(binary.length);
        for (var i = 0; i < binary.length; i++) {
            bytes[i] = binary.charCodeAt(i);
        }
        return new TextDecoder("utf-8").decode(bytes);
    }

    function renderPreviews() {
        var views = document.querySelectorAll("[data-preview]");
        for (var i = 0; i < views.length; i++) {
            var view = views[i];
            try {
                view.innerHTML = decodePreview(view.getAttribute("data-preview"));
            } catch (e) {
                console.error("Preview decode failed", e);
                view.innerHTML = '<p class="decode-error">Failed to decode table</p>';
            }
            view.removeAttribute("data-preview");
        }
    }

    function focusAnchor() {
        var id = window.location.hash ? window.location.hash.slice(1) : document.body.getAttribute("data-focus");
        if (!id) {
            return;
        }
        var target = document.getElementById(id);
        if (!target) {
            return;
        }
        var active = document.querySelectorAll(".anchor-active");
        for (var i = 0; i < active.length; i++) {
            active[i].classList.remove("anchor-active");
        }
        target.classList.add("anchor-active");
        target.scrollIntoView({ behavior: "smooth", block: "start" });
    }

    document.addEventListener("DOMContentLoaded", function () {
        setTimeout(function () {
            renderPreviews();
            focusAnchor();
        }, 50);
    });
    window.addEventListener("hashchange", focusAnchor);
})();
"##;

/// ドキュメントアセンブラー
///
/// # 使用例
///
/// ```rust
/// use xlsxdual::{DispatchOutcome, DocumentAssembler};
///
/// let artifact = DocumentAssembler::new("empty.xlsx").assemble(&DispatchOutcome::default());
/// assert!(artifact.toc.is_empty());
/// assert!(artifact.html.contains("Empty file or nothing to display"));
/// ```
#[derive(Debug, Clone)]
pub struct DocumentAssembler {
    title: String,
    focus: Option<String>,
}

impl DocumentAssembler {
    /// 表示用ファイル名をタイトルに使うアセンブラーを生成
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            focus: None,
        }
    }

    /// 開いた直後にスクロールするアンカーを指定する
    ///
    /// URLのハッシュが指定されている場合はそちらが優先されます。
    pub fn with_focus(mut self, anchor: impl Into<String>) -> Self {
        self.focus = Some(anchor.into());
        self
    }

    /// ドキュメントを組み立てる
    ///
    /// 目次と本文はディスパッチ結果と同じ順序になります。
    /// フラグメントが1つもない場合は、同じシェルで空の案内だけを包みます。
    #[instrument(skip_all, fields(sheets = outcome.fragments.len()))]
    pub fn assemble(&self, outcome: &DispatchOutcome) -> DocumentArtifact {
        let toc: Vec<TocEntry> = outcome
            .anchors
            .iter()
            .map(|entry| TocEntry {
                anchor: entry.anchor.clone(),
                sheet_name: entry.sheet_name.clone(),
            })
            .collect();

        let body = outcome
            .fragments
            .iter()
            .map(|fragment| fragment.markup.as_str())
            .collect::<Vec<_>>()
            .join(SEPARATOR);

        let content = if toc.is_empty() {
            debug!("no fragments, using placeholder body");
            EMPTY_NOTICE.to_string()
        } else {
            format!(
                "{}\n{}\n{}",
                Self::text_toc(&toc),
                Self::visible_toc(&toc),
                body
            )
        };

        let html = self.shell(&content);
        DocumentArtifact { toc, body, html }
    }

    /// 意味層向けのプレーンテキスト目次（非表示）
    fn text_toc(toc: &[TocEntry]) -> String {
        let mut text = String::from("<div class=\"rag-toc\" style=\"display:none\">\n# Workbook contents\n");
        for entry in toc {
            text.push_str("- ");
            text.push_str(&escape_html(&entry.sheet_name));
            text.push('\n');
        }
        text.push_str("</div>");
        text
    }

    fn visible_toc(toc: &[TocEntry]) -> String {
        let mut html = String::from("<div class=\"file-toc\">\n<h3>Contents</h3>\n<ul>\n");
        for entry in toc {
            html.push_str(&format!(
                "<li><a href=\"#{}\">{}</a></li>\n",
                entry.anchor,
                escape_html(&entry.sheet_name)
            ));
        }
        html.push_str("</ul>\n</div>");
        html
    }

    fn shell(&self, content: &str) -> String {
        let focus = self
            .focus
            .as_deref()
            .map(|anchor| format!(" data-focus=\"{}\"", escape_html(anchor)))
            .unwrap_or_default();

        format!(
            "<!DOCTYPE html>\n\
             <html lang=\"en\">\n\
             <head>\n\
             <meta charset=\"utf-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
             <title>{title} - Preview</title>\n\
             <style>{style}</style>\n\
             </head>\n\
             <body{focus}>\n\
             {content}\n\
             <script>{script}</script>\n\
             </body>\n\
             </html>\n",
            title = escape_html(&self.title),
            style = STYLESHEET,
            focus = focus,
            content = content,
            script = SCRIPT,
        )
    }
}
