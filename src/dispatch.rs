//! Dispatch Module
//!
//! ワークブック内の全シートに`SheetPipeline`を適用する。
//!
//! 複数シートは固定サイズのワーカープールで並列に処理し、単一シートはプールを使わず
//! 呼び出しスレッドで処理します。完了順はプール任せですが、結果は常にワークブックの
//! 宣言順に並べ直して返します。

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::anchor::{AnchorRegistry, SheetAnchor};
use crate::api::RawSheet;
use crate::error::XlsxDualError;
use crate::pipeline::SheetPipeline;
use crate::types::{AnchorEntry, SheetFragment};

/// 再利用可能な固定サイズのワーカープール
///
/// `ProcessorBuilder::build()`で1度だけ生成され、以降のすべてのリクエストで共有されます。
#[derive(Debug)]
pub struct WorkerPool {
    pool: ThreadPool,
    size: usize,
}

impl WorkerPool {
    /// `size`スレッドのプールを生成
    ///
    /// # 戻り値
    ///
    /// * `Err(XlsxDualError::Config)` - `size`が0、またはスレッドを起動できなかった場合
    pub fn new(size: usize) -> Result<Self, XlsxDualError> {
        if size == 0 {
            return Err(XlsxDualError::Config(
                "Worker pool size must be at least 1".to_string(),
            ));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(size)
            .thread_name(|i| format!("xlsxdual-worker-{}", i))
            .build()
            .map_err(|e| XlsxDualError::Config(format!("Failed to start worker pool: {}", e)))?;

        Ok(Self { pool, size })
    }

    /// プールのスレッド数
    pub fn size(&self) -> usize {
        self.size
    }

    /// 各要素にタスクを適用し、入力と同じ順序で結果を返す
    ///
    /// タスクはこのプールの中で並列に実行されます。完了順に関係なく、
    /// 結果は入力のインデックス順に並びます。
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use xlsxdual::WorkerPool;
    ///
    /// let pool = WorkerPool::new(2).unwrap();
    /// let squares = pool.run_ordered(vec![1, 2, 3], |_, n| n * n);
    /// assert_eq!(squares, vec![1, 4, 9]);
    /// ```
    pub fn run_ordered<T, R, F>(&self, items: Vec<T>, task: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(usize, T) -> R + Sync,
    {
        self.pool.install(|| {
            items
                .into_par_iter()
                .enumerate()
                .map(|(idx, item)| task(idx, item))
                .collect()
        })
    }
}

/// ディスパッチ結果
///
/// フラグメントとアンカーマップは、どちらもワークブックの宣言順に並びます。
/// 空シートはどちらにも含まれません。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub fragments: Vec<SheetFragment>,
    pub anchors: Vec<AnchorEntry>,
}

impl DispatchOutcome {
    /// 出力対象のシートが1つもないかどうか
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// 並列ディスパッチャー
///
/// アンカーは作業開始前に宣言順でまとめて発行し、各タスクに渡します。
/// ワーカー間で共有される可変状態はなく、結果の収集はディスパッチャーだけが行います。
#[derive(Debug)]
pub struct ParallelDispatcher<'p> {
    pool: &'p WorkerPool,
    pipeline: SheetPipeline,
    anchor_seed: Option<u64>,
}

impl<'p> ParallelDispatcher<'p> {
    pub fn new(pool: &'p WorkerPool, pipeline: SheetPipeline) -> Self {
        Self {
            pool,
            pipeline,
            anchor_seed: None,
        }
    }

    /// アンカー発行のシードを指定する（`None`は毎回ランダム）
    pub fn with_anchor_seed(mut self, seed: Option<u64>) -> Self {
        self.anchor_seed = seed;
        self
    }

    /// 全シートを処理する
    pub fn dispatch(&self, sheets: &[RawSheet]) -> DispatchOutcome {
        let mut registry = AnchorRegistry::new(self.anchor_seed);
        let anchors: Vec<SheetAnchor> = sheets.iter().map(|_| registry.issue()).collect();

        let results: Vec<Option<SheetFragment>> = match sheets {
            [] => Vec::new(),
            [sheet] => {
                debug!("single sheet, processing inline");
                vec![self.pipeline.run(sheet, &anchors[0])]
            }
            _ => {
                debug!(
                    sheets = sheets.len(),
                    workers = self.pool.size(),
                    "dispatching sheets to worker pool"
                );
                let jobs: Vec<(&RawSheet, &SheetAnchor)> = sheets.iter().zip(&anchors).collect();
                self.pool
                    .run_ordered(jobs, |_, (sheet, anchor)| self.pipeline.run(sheet, anchor))
            }
        };

        let fragments: Vec<SheetFragment> = results.into_iter().flatten().collect();
        let anchors = fragments
            .iter()
            .map(|fragment| AnchorEntry {
                sheet_name: fragment.sheet_name.clone(),
                anchor: fragment.anchor.clone(),
            })
            .collect();

        debug!(
            produced = fragments.len(),
            omitted = sheets.len() - fragments.len(),
            "dispatch finished"
        );

        DispatchOutcome { fragments, anchors }
    }
}
