use crate::application::services::fan_out::run_across;
use crate::common::error::LibwsError;
use crate::common::result::LibwsResult;
use crate::domain::entities::{Operation, OperationResult};
use crate::infrastructure::filesystem::RepositoryScanner;
use crate::infrastructure::git::RepositoryOperations;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// 全リポジトリの変更を同じメッセージでコミットするユースケース
pub struct CommitAllUseCase {
    runner: Arc<dyn RepositoryOperations>,
    max_parallel: usize,
}

impl CommitAllUseCase {
    pub fn new(runner: Arc<dyn RepositoryOperations>, max_parallel: usize) -> Self {
        Self {
            runner,
            max_parallel,
        }
    }

    /// コミットを実行し、リポジトリごとの結果をスキャン順で返す
    pub async fn execute(&self, workspace_root: &Path, message: &str) -> LibwsResult<Vec<OperationResult>> {
        if message.trim().is_empty() {
            return Err(LibwsError::validation_error(
                "message",
                "Commit message must not be empty",
            ));
        }

        let repositories = RepositoryScanner::new().scan(workspace_root).await?;
        let results = run_across(
            Arc::clone(&self.runner),
            &repositories,
            &Operation::Commit {
                message: message.to_string(),
            },
            self.max_parallel,
        )
        .await;

        info!(
            "Committed in {} of {} repositories",
            results
                .iter()
                .filter(|r| matches!(r.outcome, Ok(ref o) if !o.is_unchanged()))
                .count(),
            results.len()
        );
        Ok(results)
    }
}
