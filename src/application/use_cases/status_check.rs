use crate::application::services::fan_out::run_across;
use crate::common::result::LibwsResult;
use crate::domain::entities::{Operation, OperationOutcome, OperationResult};
use crate::infrastructure::filesystem::RepositoryScanner;
use crate::infrastructure::git::RepositoryOperations;
use std::path::Path;
use std::sync::Arc;

/// ステータス確認の設定
#[derive(Debug, Clone)]
pub struct StatusCheckConfig {
    /// 変更のないリポジトリも結果に含めるか
    pub show_all: bool,

    /// 最大並列数
    pub max_parallel: usize,
}

impl Default for StatusCheckConfig {
    fn default() -> Self {
        Self {
            show_all: false,
            max_parallel: num_cpus::get(),
        }
    }
}

impl StatusCheckConfig {
    pub fn with_show_all(mut self, show_all: bool) -> Self {
        self.show_all = show_all;
        self
    }

    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel;
        self
    }
}

/// ステータス確認の結果
#[derive(Debug, Clone, Default)]
pub struct StatusReport {
    /// 表示対象のリポジトリ（スキャン順）
    pub results: Vec<OperationResult>,

    /// スキャンしたリポジトリの総数
    pub scanned: usize,
}

impl StatusReport {
    /// 変更のあるリポジトリの数
    pub fn dirty_count(&self) -> usize {
        self.results.iter().filter(|r| is_dirty(r)).count()
    }

    /// 失敗したリポジトリの数
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_success()).count()
    }
}

/// 全リポジトリのステータスを並列に確認するユースケース
pub struct StatusCheckUseCase {
    runner: Arc<dyn RepositoryOperations>,
    config: StatusCheckConfig,
}

impl StatusCheckUseCase {
    pub fn new(runner: Arc<dyn RepositoryOperations>, config: StatusCheckConfig) -> Self {
        Self { runner, config }
    }

    /// ステータス確認を実行
    ///
    /// `show_all` が無効な場合、変更がなく成功したリポジトリは省かれる。
    pub async fn execute(&self, workspace_root: &Path) -> LibwsResult<StatusReport> {
        let repositories = RepositoryScanner::new().scan(workspace_root).await?;
        let results = run_across(
            Arc::clone(&self.runner),
            &repositories,
            &Operation::Status,
            self.config.max_parallel,
        )
        .await;

        let results = results
            .into_iter()
            .filter(|result| self.config.show_all || !result.is_success() || is_dirty(result))
            .collect();

        Ok(StatusReport {
            results,
            scanned: repositories.len(),
        })
    }
}

fn is_dirty(result: &OperationResult) -> bool {
    matches!(&result.outcome, Ok(OperationOutcome::Status { changes, .. }) if !changes.is_empty())
}
