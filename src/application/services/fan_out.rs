use crate::domain::entities::{Operation, OperationError, OperationResult, RepositoryRecord};
use crate::infrastructure::git::RepositoryOperations;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

/// Run `operation` against every repository concurrently.
///
/// At most `max_parallel` git processes run at a time. The returned results
/// follow the order of `repositories`, whatever order the tasks finish in,
/// and a failing repository only affects its own entry.
pub async fn run_across(
    runner: Arc<dyn RepositoryOperations>,
    repositories: &[RepositoryRecord],
    operation: &Operation,
    max_parallel: usize,
) -> Vec<OperationResult> {
    let max_parallel = max_parallel.max(1);
    debug!(
        "Running {} across {} repositories ({} at a time)",
        operation.kind(),
        repositories.len(),
        max_parallel
    );
    let semaphore = Arc::new(Semaphore::new(max_parallel));

    let tasks: Vec<_> = repositories
        .iter()
        .map(|record| {
            let runner = Arc::clone(&runner);
            let semaphore = Arc::clone(&semaphore);
            let operation = operation.clone();
            let record = record.clone();

            tokio::spawn(async move {
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return OperationResult::new(
                            record.name,
                            operation.kind(),
                            Err(OperationError::Process {
                                message: e.to_string(),
                            }),
                        )
                    }
                };
                runner.run(&operation, &record.path).await
            })
        })
        .collect();

    join_all(tasks)
        .await
        .into_iter()
        .zip(repositories)
        .map(|(joined, record)| {
            joined.unwrap_or_else(|e| {
                OperationResult::new(
                    record.name.clone(),
                    operation.kind(),
                    Err(OperationError::Process {
                        message: format!("Task failed: {}", e),
                    }),
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{OperationKind, OperationOutcome};
    use crate::infrastructure::git::operation_runner::MockRepositoryOperations;
    use crate::infrastructure::git::repository_name;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn records(names: &[&str]) -> Vec<RepositoryRecord> {
        names
            .iter()
            .map(|name| RepositoryRecord::from_path(format!("/ws/{}", name)))
            .collect()
    }

    #[tokio::test]
    async fn test_results_keep_input_order() {
        let mut mock = MockRepositoryOperations::new();
        mock.expect_run().times(3).returning(|operation, directory| {
            let name = repository_name(directory);
            let outcome = if name == "b" {
                Err(OperationError::Failed {
                    message: "broken".to_string(),
                })
            } else {
                Ok(OperationOutcome::NothingToCommit)
            };
            OperationResult::new(name, operation.kind(), outcome)
        });

        let results = run_across(
            Arc::new(mock),
            &records(&["a", "b", "c"]),
            &Operation::Commit {
                message: "msg".to_string(),
            },
            2,
        )
        .await;

        let names: Vec<&str> = results.iter().map(|r| r.repository.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(results[0].is_success());
        assert!(!results[1].is_success());
        assert!(results[2].is_success());
        assert!(results.iter().all(|r| r.kind == OperationKind::Commit));
    }

    #[tokio::test]
    async fn test_empty_workspace() {
        let mock = MockRepositoryOperations::new();
        let results = run_across(Arc::new(mock), &[], &Operation::Status, 4).await;
        assert!(results.is_empty());
    }

    /// Runner that records the highest number of concurrent calls
    struct CountingRunner {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl RepositoryOperations for CountingRunner {
        async fn run(&self, operation: &Operation, directory: &std::path::Path) -> OperationResult {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            OperationResult::new(
                repository_name(directory),
                operation.kind(),
                Ok(OperationOutcome::Status {
                    branch: "main".to_string(),
                    changes: Vec::new(),
                }),
            )
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallelism_is_bounded() {
        let runner = Arc::new(CountingRunner {
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });

        let results = run_across(
            runner.clone(),
            &records(&["a", "b", "c", "d", "e", "f"]),
            &Operation::Status,
            2,
        )
        .await;

        assert_eq!(results.len(), 6);
        assert!(runner.peak.load(Ordering::SeqCst) <= 2);
    }
}
