//! Pipeline Module
//!
//! 1シートを正規化・要約・プレビュー化し、自己完結したフラグメントにまとめる。
//!
//! フラグメントは2層で構成されます。
//!
//! - 意味層: `display:none`のブロック。ブラウザには表示されないが、文書テキストとして
//!   取り込まれる。要約行とMarkdownスナップショットを含む
//! - 表示層: Base64のプレビューを`data-preview`属性に持つコンテナ。ドキュメント共有の
//!   スクリプトが読み込み後にデコードしてテーブルに置き換える

use std::fmt::Write;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, instrument, warn};

use crate::anchor::SheetAnchor;
use crate::api::RawSheet;
use crate::builder::ProcessingConfig;
use crate::error::XlsxDualError;
use crate::normalize::TableNormalizer;
use crate::output::{escape_html, MarkdownFormatter};
use crate::preview::PreviewEncoder;
use crate::summary::SemanticSummaryBuilder;
use crate::types::{NormalizedTable, SheetFragment};

/// シート単位の処理パイプライン
///
/// 状態を持たないため、複数のワーカーから同時に呼び出せます。
#[derive(Debug, Clone)]
pub struct SheetPipeline {
    config: ProcessingConfig,
    source_url: Option<String>,
    #[cfg(test)]
    fault: Option<Fault>,
}

/// テスト用に特定シートの処理を失敗させる
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) enum Fault {
    /// 指定シートで`Render`エラーを返す
    Error(String),
    /// 指定シートでパニックする
    Panic(String),
    /// すべてのシートで`Render`エラーを返す
    All,
}

impl SheetPipeline {
    /// パイプラインを生成
    ///
    /// # 引数
    ///
    /// * `config` - 行数上限などの処理設定
    /// * `source_url` - 元ファイルの取得URL。指定すると意味層とフッターにそのまま埋め込まれる
    pub fn new(config: ProcessingConfig, source_url: Option<String>) -> Self {
        Self {
            config,
            source_url,
            #[cfg(test)]
            fault: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = Some(fault);
        self
    }

    #[cfg(test)]
    fn check_fault(&self, sheet_name: &str) -> Result<(), XlsxDualError> {
        match &self.fault {
            Some(Fault::Error(name)) if name == sheet_name => {
                Err(XlsxDualError::render(sheet_name, "injected failure"))
            }
            Some(Fault::Panic(name)) if name == sheet_name => panic!("injected panic"),
            Some(Fault::All) => Err(XlsxDualError::render(sheet_name, "injected failure")),
            _ => Ok(()),
        }
    }

    #[cfg(not(test))]
    fn check_fault(&self, _sheet_name: &str) -> Result<(), XlsxDualError> {
        Ok(())
    }

    /// 1シートを処理する
    ///
    /// # 戻り値
    ///
    /// * `None` - トリミング後にシートが空だった場合（シートは出力から除外される）
    /// * `Some(fragment)` - 正常なフラグメント、または描画に失敗した場合のエラーフラグメント
    ///
    /// 内部のエラーとパニックはどちらもエラーフラグメントに変換され、呼び出し元には伝播しません。
    #[instrument(skip_all, fields(sheet = %sheet.name))]
    pub fn run(&self, sheet: &RawSheet, anchor: &SheetAnchor) -> Option<SheetFragment> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.try_run(sheet, anchor)));

        match outcome {
            Ok(Ok(fragment)) => fragment,
            Ok(Err(err)) => {
                warn!(error = %err, "sheet rendering failed");
                Some(Self::error_fragment(&sheet.name, anchor, &failure_message(&err)))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(error = %message, "sheet rendering panicked");
                Some(Self::error_fragment(&sheet.name, anchor, &message))
            }
        }
    }

    fn try_run(
        &self,
        sheet: &RawSheet,
        anchor: &SheetAnchor,
    ) -> Result<Option<SheetFragment>, XlsxDualError> {
        let Some(table) = TableNormalizer::normalize(sheet) else {
            debug!("no data rows, sheet omitted");
            return Ok(None);
        };

        self.check_fault(&sheet.name)?;
        self.render(&sheet.name, &table, anchor).map(Some)
    }

    fn render(
        &self,
        sheet_name: &str,
        table: &NormalizedTable,
        anchor: &SheetAnchor,
    ) -> Result<SheetFragment, XlsxDualError> {
        let id = anchor.id();

        let lines = SemanticSummaryBuilder::new(self.config.max_summary_rows).build(table, sheet_name);
        let summary = SemanticSummaryBuilder::render_section(&lines, sheet_name);
        let markdown = MarkdownFormatter::render(table, self.config.max_markdown_rows)
            .map_err(|e| XlsxDualError::render(sheet_name, e.to_string()))?;
        let preview = PreviewEncoder::new(self.config.max_preview_rows)
            .encode(table)
            .map_err(|e| XlsxDualError::render(sheet_name, e.to_string()))?;

        let semantic_block = self.semantic_block(&id, sheet_name, &summary, &markdown)?;

        let mut markup = String::new();
        writeln!(markup, "<div class=\"sheet-container\" id=\"{}\">", id)?;
        writeln!(markup, "<h2 class=\"sheet-title\">{}</h2>", escape_html(sheet_name))?;
        if preview.truncated {
            writeln!(
                markup,
                "<p class=\"warning-text\">(Large table: only the first {} rows are shown.)</p>",
                self.config.max_preview_rows
            )?;
        }
        markup.push_str(&semantic_block);
        writeln!(
            markup,
            "<div id=\"view-{}\" class=\"sheet-view\" data-preview=\"{}\">",
            id, preview.blob
        )?;
        writeln!(markup, "<div class=\"loading-box\">Decoding table...</div>")?;
        writeln!(markup, "</div>")?;
        if let Some(url) = &self.source_url {
            writeln!(
                markup,
                "<p class=\"source-link\"><a href=\"{}\">Download original file</a></p>",
                escape_html(url)
            )?;
        }
        write!(markup, "</div>")?;

        debug!(
            summary_lines = lines.len(),
            preview_rows = preview.rendered_rows,
            truncated = preview.truncated,
            "fragment assembled"
        );

        Ok(SheetFragment {
            sheet_name: sheet_name.to_string(),
            anchor: id,
            semantic_block,
            encoded_preview: preview.blob,
            truncated: preview.truncated,
            markup,
            failed: false,
        })
    }

    /// 意味層のブロック（すべてHTMLエスケープ済み）
    fn semantic_block(
        &self,
        id: &str,
        sheet_name: &str,
        summary: &str,
        markdown: &str,
    ) -> Result<String, XlsxDualError> {
        let mut block = String::new();
        writeln!(
            block,
            "<div id=\"rag-{}\" style=\"display:none; height:0; overflow:hidden;\">",
            id
        )?;
        writeln!(block, "<h1>Sheet: {}</h1>", escape_html(sheet_name))?;
        if let Some(url) = &self.source_url {
            writeln!(block, "Source file: {}", escape_html(url))?;
        }
        if !summary.is_empty() {
            writeln!(block)?;
            block.push_str(&escape_html(summary));
        }
        writeln!(block)?;
        writeln!(block, "### {} - table snapshot (Markdown)", escape_html(sheet_name))?;
        block.push_str(&escape_html(markdown));
        writeln!(block, "</div>")?;
        Ok(block)
    }

    /// シート名とメッセージを表示するエラーフラグメント
    fn error_fragment(sheet_name: &str, anchor: &SheetAnchor, message: &str) -> SheetFragment {
        let id = anchor.error_id();
        let markup = format!(
            "<div class=\"sheet-error\" id=\"{}\">Sheet: {} failed: {}</div>",
            id,
            escape_html(sheet_name),
            escape_html(message)
        );

        SheetFragment {
            sheet_name: sheet_name.to_string(),
            anchor: id,
            semantic_block: String::new(),
            encoded_preview: String::new(),
            truncated: false,
            markup,
            failed: true,
        }
    }
}

fn failure_message(err: &XlsxDualError) -> String {
    match err {
        XlsxDualError::Render { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
