use crate::common::result::{LibwsResult, ResultExt};
use crate::domain::entities::repository::VCS_METADATA_DIR;
use crate::domain::entities::RepositoryRecord;
use futures::future::join_all;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Finds the checkouts that live directly under a workspace root
#[derive(Debug, Clone, Default)]
pub struct RepositoryScanner;

impl RepositoryScanner {
    pub fn new() -> Self {
        Self
    }

    /// List every immediate child directory of `root` that holds a `.git`
    /// entry, sorted by name.
    ///
    /// Plain files and directories without version-control metadata are
    /// skipped silently. Only a failure to read `root` itself is an error.
    pub async fn scan(&self, root: &Path) -> LibwsResult<Vec<RepositoryRecord>> {
        let mut entries = tokio::fs::read_dir(root)
            .await
            .with_filesystem_error("Failed to read workspace directory", Some(root.to_path_buf()))?;

        let mut candidates: Vec<PathBuf> = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_filesystem_error("Failed to read workspace directory", Some(root.to_path_buf()))?
        {
            candidates.push(entry.path());
        }

        let checks = candidates.into_iter().map(|path| async move {
            let is_dir = tokio::fs::metadata(&path)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);
            let is_checkout = is_dir
                && tokio::fs::try_exists(path.join(VCS_METADATA_DIR))
                    .await
                    .unwrap_or(false);
            is_checkout.then(|| RepositoryRecord::from_path(path))
        });

        let mut records: Vec<RepositoryRecord> =
            join_all(checks).await.into_iter().flatten().collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));

        debug!("Found {} repositories in {}", records.len(), root.display());
        Ok(records)
    }
}
