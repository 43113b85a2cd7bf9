//! Builder Module
//!
//! Fluent Builder APIを提供し、`Processor`インスタンスを段階的に構築する。

use std::io::Read;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

use crate::api::RawSheet;
use crate::assembler::DocumentAssembler;
use crate::dispatch::{DispatchOutcome, ParallelDispatcher, WorkerPool};
use crate::error::XlsxDualError;
use crate::parser::WorkbookReader;
use crate::pipeline::SheetPipeline;
use crate::types::{ProcessedWorkbook, SheetOutput};

/// 処理設定
///
/// 行数上限とワーカー数を明示的に保持する設定レコードです。
/// デフォルト値は本番運用の固定値で、テストや組み込み用途でのみ変更します。
///
/// `#[serde(default)]`により、一部のフィールドだけを持つJSONからも完全な設定が得られます。
///
/// ```rust
/// use xlsxdual::ProcessingConfig;
///
/// let config: ProcessingConfig = serde_json::from_str(r#"{"worker_count": 2}"#).unwrap();
/// assert_eq!(config.worker_count, 2);
/// assert_eq!(config.max_preview_rows, 3000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// 意味要約の最大行数（シートごと）
    pub max_summary_rows: usize,

    /// Markdownスナップショットの最大行数（シートごと）
    pub max_markdown_rows: usize,

    /// プレビューの最大行数（シートごと）
    pub max_preview_rows: usize,

    /// 複数シートを処理するワーカー数
    pub worker_count: usize,

    /// 入力ファイルの最大サイズ（バイト）
    pub max_input_file_size: u64,

    /// アンカーIDを再現可能にするシード
    pub anchor_seed: Option<u64>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_summary_rows: 50,
            max_markdown_rows: 1000,
            max_preview_rows: 3000,
            worker_count: 4,
            max_input_file_size: 2_147_483_648, // 2GB
            anchor_seed: None,
        }
    }
}

/// 1リクエスト分のドキュメント情報
///
/// # 使用例
///
/// ```rust
/// use xlsxdual::DocumentInfo;
///
/// let info = DocumentInfo::new("report.xlsx")
///     .with_source_url("https://files.example.com/report.xlsx")
///     .with_focus_sheet("Summary");
/// assert_eq!(info.filename, "report.xlsx");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentInfo {
    /// 表示用ファイル名（ドキュメントのタイトルになる）
    pub filename: String,

    /// 元ファイルの取得URL
    pub source_url: Option<String>,

    /// 開いた直後にスクロールするシート名（同名が複数ある場合は最初のシート）
    pub focus_sheet: Option<String>,
}

impl DocumentInfo {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    pub fn with_focus_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.focus_sheet = Some(sheet.into());
        self
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `Processor`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust
/// use xlsxdual::ProcessorBuilder;
///
/// # fn main() -> Result<(), xlsxdual::XlsxDualError> {
/// let processor = ProcessorBuilder::new()
///     .with_worker_count(2)
///     .with_anchor_seed(42)
///     .build()?;
/// assert_eq!(processor.config().worker_count, 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ProcessorBuilder {
    /// 内部設定（構築中）
    config: ProcessingConfig,
}

impl ProcessorBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - 意味要約: 50行
    /// - Markdownスナップショット: 1000行
    /// - プレビュー: 3000行
    /// - ワーカー数: 4
    /// - 入力サイズ上限: 2GB
    /// - アンカー: 毎回ランダム
    pub fn new() -> Self {
        Self::default()
    }

    /// 設定レコード全体を差し替える
    pub fn with_config(mut self, config: ProcessingConfig) -> Self {
        self.config = config;
        self
    }

    /// 意味要約の最大行数を指定する
    pub fn with_max_summary_rows(mut self, rows: usize) -> Self {
        self.config.max_summary_rows = rows;
        self
    }

    /// Markdownスナップショットの最大行数を指定する
    pub fn with_max_markdown_rows(mut self, rows: usize) -> Self {
        self.config.max_markdown_rows = rows;
        self
    }

    /// プレビューの最大行数を指定する
    ///
    /// 超過したシートのプレビューは切り詰められ、警告文が付きます。
    pub fn with_max_preview_rows(mut self, rows: usize) -> Self {
        self.config.max_preview_rows = rows;
        self
    }

    /// ワーカープールのスレッド数を指定する
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use xlsxdual::ProcessorBuilder;
    ///
    /// // 逐次処理（1スレッド）
    /// let processor = ProcessorBuilder::new().with_worker_count(1).build().unwrap();
    /// ```
    pub fn with_worker_count(mut self, count: usize) -> Self {
        self.config.worker_count = count;
        self
    }

    /// 入力ファイルの最大サイズ（バイト）を指定する
    pub fn with_max_input_file_size(mut self, bytes: u64) -> Self {
        self.config.max_input_file_size = bytes;
        self
    }

    /// アンカーIDのシードを指定する
    ///
    /// 同じシードと同じワークブックからは、ワーカー数に関係なく同一の出力が得られます。
    pub fn with_anchor_seed(mut self, seed: u64) -> Self {
        self.config.anchor_seed = Some(seed);
        self
    }

    /// 設定を検証し、`Processor`インスタンスを生成する
    ///
    /// ワーカープールはここで1度だけ起動され、`Processor`の全リクエストで再利用されます。
    ///
    /// # 発生し得るエラー
    ///
    /// * `XlsxDualError::Config(String)`: 設定の検証に失敗した場合
    ///   * ワーカー数が0
    ///   * 入力サイズ上限が0
    ///   * プレビュー行数が0
    ///   * ワーカープールを起動できなかった
    pub fn build(self) -> Result<Processor, XlsxDualError> {
        if self.config.worker_count == 0 {
            return Err(XlsxDualError::Config(
                "Worker count must be at least 1".to_string(),
            ));
        }

        if self.config.max_input_file_size == 0 {
            return Err(XlsxDualError::Config(
                "Maximum input file size must be greater than 0".to_string(),
            ));
        }

        if self.config.max_preview_rows == 0 {
            return Err(XlsxDualError::Config(
                "Maximum preview rows must be greater than 0".to_string(),
            ));
        }

        let pool = WorkerPool::new(self.config.worker_count)?;
        let reader = WorkbookReader::new(self.config.max_input_file_size);

        Ok(Processor {
            config: self.config,
            pool,
            reader,
        })
    }
}

/// 処理のファサード
///
/// ワークブックを受け取り、二層構造のHTMLドキュメントとアンカーマップを生成する
/// メインエントリーポイントです。
///
/// # 使用例
///
/// ```rust,no_run
/// use std::fs::File;
/// use xlsxdual::{DocumentInfo, ProcessorBuilder};
///
/// # fn main() -> Result<(), xlsxdual::XlsxDualError> {
/// let processor = ProcessorBuilder::new().build()?;
/// let input = File::open("example.xlsx")?;
/// let result = processor.process(input, &DocumentInfo::new("example.xlsx"))?;
/// std::fs::write("example.html", &result.combined)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Processor {
    config: ProcessingConfig,
    pool: WorkerPool,
    reader: WorkbookReader,
}

impl Processor {
    /// 検証済みの設定
    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// リーダーからワークブックを読み込んで処理する
    ///
    /// # 戻り値
    ///
    /// * `Ok(ProcessedWorkbook)` - 処理に成功した場合（個々のシートの失敗はエラーフラグメントになる）
    /// * `Err(XlsxDualError)` - ワークブック全体を読めなかった場合。部分的なドキュメントは生成されない
    pub fn process<R: Read>(
        &self,
        input: R,
        info: &DocumentInfo,
    ) -> Result<ProcessedWorkbook, XlsxDualError> {
        let span = info_span!("process", filename = %info.filename);
        let _guard = span.enter();

        let sheets = self.reader.read(input)?;
        Ok(self.process_sheets(&sheets, info))
    }

    /// バイト列からワークブックを処理する
    pub fn process_bytes(
        &self,
        bytes: Vec<u8>,
        info: &DocumentInfo,
    ) -> Result<ProcessedWorkbook, XlsxDualError> {
        let span = info_span!("process", filename = %info.filename);
        let _guard = span.enter();

        let sheets = self.reader.read_bytes(bytes)?;
        Ok(self.process_sheets(&sheets, info))
    }

    /// デコード済みのシートを処理する
    ///
    /// シート名が重複していても、それぞれ別のアンカーを持つフラグメントになります。
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use xlsxdual::{DocumentInfo, ProcessorBuilder, RawSheet};
    ///
    /// let processor = ProcessorBuilder::new().build().unwrap();
    /// let sheets = vec![RawSheet::from_strings("Sheet1", &[&["Name", "Age"], &["Alice", "30"]])];
    /// let result = processor.process_sheets(&sheets, &DocumentInfo::new("memory.xlsx"));
    /// assert_eq!(result.sheet_names(), vec!["Sheet1"]);
    /// ```
    pub fn process_sheets(&self, sheets: &[RawSheet], info: &DocumentInfo) -> ProcessedWorkbook {
        let started = Instant::now();

        let outcome = self.dispatch(sheets, info.source_url.clone());

        let mut assembler = DocumentAssembler::new(info.filename.clone());
        if let Some(anchor) = info.focus_sheet.as_deref().and_then(|name| {
            outcome
                .anchors
                .iter()
                .find(|entry| entry.sheet_name == name)
                .map(|entry| entry.anchor.clone())
        }) {
            assembler = assembler.with_focus(anchor);
        }
        let artifact = assembler.assemble(&outcome);

        let failed = outcome.fragments.iter().filter(|f| f.failed).count();
        info!(
            sheets = sheets.len(),
            rendered = outcome.fragments.len(),
            failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "workbook processed"
        );

        let DispatchOutcome { fragments, anchors } = outcome;
        ProcessedWorkbook {
            filename: info.filename.clone(),
            sheets: fragments
                .into_iter()
                .map(|fragment| SheetOutput {
                    name: fragment.sheet_name,
                    anchor: fragment.anchor,
                    html: fragment.markup,
                    truncated: fragment.truncated,
                    failed: fragment.failed,
                })
                .collect(),
            anchors,
            combined: artifact.html,
        }
    }

    /// シートをフラグメントに変換する（ドキュメントは組み立てない）
    pub fn dispatch(&self, sheets: &[RawSheet], source_url: Option<String>) -> DispatchOutcome {
        let pipeline = SheetPipeline::new(self.config.clone(), source_url);
        ParallelDispatcher::new(&self.pool, pipeline)
            .with_anchor_seed(self.config.anchor_seed)
            .dispatch(sheets)
    }
}
