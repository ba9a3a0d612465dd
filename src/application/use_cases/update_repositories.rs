use crate::application::services::BatchQueue;
use crate::common::result::LibwsResult;
use crate::domain::entities::{Operation, OperationResult, RepositoryRecord};
use crate::infrastructure::filesystem::RepositoryScanner;
use crate::infrastructure::git::RepositoryOperations;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// リモートとの同期方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    Pull,
    Push,
}

impl UpdateMode {
    fn operation(self) -> Operation {
        match self {
            UpdateMode::Pull => Operation::Pull,
            UpdateMode::Push => Operation::Push,
        }
    }
}

/// ワークスペース内の全チェックアウトをpull/pushするユースケース
///
/// リポジトリは1件ずつ処理され、各ステップの間に進捗を表示できる。
pub struct UpdateRepositoriesUseCase {
    runner: Arc<dyn RepositoryOperations>,
    scanner: RepositoryScanner,
    mode: UpdateMode,
    queue: BatchQueue<RepositoryRecord>,
}

impl UpdateRepositoriesUseCase {
    /// 新しいUpdateRepositoriesUseCaseを作成
    pub fn new(runner: Arc<dyn RepositoryOperations>, mode: UpdateMode) -> Self {
        Self {
            runner,
            scanner: RepositoryScanner::new(),
            mode,
            queue: BatchQueue::new(),
        }
    }

    /// ワークスペースをスキャンしてキューを初期化し、件数を返す
    pub async fn prepare(&mut self, workspace_root: &Path) -> LibwsResult<usize> {
        let repositories = self.scanner.scan(workspace_root).await?;
        info!(
            "Queued {} repositories for {}",
            repositories.len(),
            self.mode.operation().kind()
        );
        self.queue.init(repositories);
        Ok(self.queue.total())
    }

    /// 次に処理されるリポジトリ
    pub fn upcoming(&self) -> Option<&RepositoryRecord> {
        self.queue.peek()
    }

    /// 1件取り出して実行する。キューが空ならNone
    pub async fn step(&mut self) -> Option<OperationResult> {
        let record = self.queue.next()?;
        Some(self.runner.run(&self.mode.operation(), &record.path).await)
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn total(&self) -> usize {
        self.queue.total()
    }
}
