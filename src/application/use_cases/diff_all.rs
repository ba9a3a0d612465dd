use crate::application::services::fan_out::run_across;
use crate::common::result::LibwsResult;
use crate::domain::entities::{Operation, OperationOutcome, OperationResult};
use crate::infrastructure::filesystem::RepositoryScanner;
use crate::infrastructure::git::RepositoryOperations;
use std::path::Path;
use std::sync::Arc;

/// ワークスペース全体の差分
#[derive(Debug, Clone, Default)]
pub struct CombinedDiff {
    /// 全リポジトリのパッチを連結したもの
    pub patch: String,

    /// 差分があったリポジトリ名
    pub changed: Vec<String>,

    /// 失敗したリポジトリの結果
    pub failures: Vec<OperationResult>,
}

/// 全リポジトリの差分を1つのパッチにまとめるユースケース
pub struct DiffAllUseCase {
    runner: Arc<dyn RepositoryOperations>,
    max_parallel: usize,
}

impl DiffAllUseCase {
    pub fn new(runner: Arc<dyn RepositoryOperations>, max_parallel: usize) -> Self {
        Self {
            runner,
            max_parallel,
        }
    }

    pub async fn execute(&self, workspace_root: &Path) -> LibwsResult<CombinedDiff> {
        let repositories = RepositoryScanner::new().scan(workspace_root).await?;
        let results = run_across(
            Arc::clone(&self.runner),
            &repositories,
            &Operation::Diff,
            self.max_parallel,
        )
        .await;

        Ok(combine(results))
    }
}

/// スキャン順にパッチを連結
fn combine(results: Vec<OperationResult>) -> CombinedDiff {
    let mut combined = CombinedDiff::default();

    for result in results {
        match &result.outcome {
            Ok(OperationOutcome::Diff { patch }) if !patch.is_empty() => {
                combined.patch.push_str(patch);
                if !patch.ends_with('\n') {
                    combined.patch.push('\n');
                }
                combined.changed.push(result.repository.clone());
            }
            Ok(_) => {}
            Err(_) => combined.failures.push(result),
        }
    }

    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{OperationError, OperationKind};
    use pretty_assertions::assert_eq;

    fn diff(name: &str, patch: &str) -> OperationResult {
        OperationResult::new(
            name,
            OperationKind::Diff,
            Ok(OperationOutcome::Diff {
                patch: patch.to_string(),
            }),
        )
    }

    #[test]
    fn test_combine_keeps_order_and_skips_empty() {
        let combined = combine(vec![
            diff("a", "diff --git a/a/x b/a/x\n"),
            diff("b", ""),
            diff("c", "diff --git a/c/y b/c/y"),
            OperationResult::new(
                "d",
                OperationKind::Diff,
                Err(OperationError::Failed {
                    message: "boom".to_string(),
                }),
            ),
        ]);

        assert_eq!(
            combined.patch,
            "diff --git a/a/x b/a/x\ndiff --git a/c/y b/c/y\n"
        );
        assert_eq!(combined.changed, vec!["a", "c"]);
        assert_eq!(combined.failures.len(), 1);
        assert_eq!(combined.failures[0].repository, "d");
    }
}
