use crate::application::services::{BatchQueue, DependencyResolver, ResolveError};
use crate::domain::entities::{LibraryDescriptor, Operation, OperationResult};
use crate::domain::value_objects::CloneUrl;
use crate::infrastructure::filesystem::{read_version_file, VersionFileError};
use crate::infrastructure::git::RepositoryOperations;
use crate::infrastructure::registry::RegistryError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// CloneLibraries関連のエラー
#[derive(Debug, Error)]
pub enum CloneLibrariesError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    VersionFile(#[from] VersionFileError),
}

/// クローン待ちの1ライブラリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneTarget {
    /// ライブラリ名（machineName）
    pub name: String,

    /// クローン元URL
    pub url: String,

    /// クローン先ディレクトリ
    pub directory: PathBuf,
}

impl CloneTarget {
    /// 記述子からクローン先を決定
    ///
    /// ディレクトリ名はURLのリポジトリ名。URLを解釈できない場合はmachineName。
    pub fn from_descriptor(descriptor: &LibraryDescriptor, workspace_root: &Path) -> Self {
        let directory_name = CloneUrl::new(&descriptor.repository)
            .ok()
            .and_then(|url| url.repo_name().map(str::to_string))
            .unwrap_or_else(|| descriptor.machine_name.clone());

        Self {
            name: descriptor.machine_name.clone(),
            url: descriptor.repository.clone(),
            directory: workspace_root.join(directory_name),
        }
    }
}

/// ライブラリを依存関係ごとワークスペースにクローンするユースケース
///
/// `prepare` でキューを満たし、呼び出し側が `step` を繰り返して1件ずつ処理する。
pub struct CloneLibrariesUseCase {
    resolver: DependencyResolver,
    runner: Arc<dyn RepositoryOperations>,
    workspace_root: PathBuf,
    queue: BatchQueue<CloneTarget>,
}

impl CloneLibrariesUseCase {
    /// 新しいCloneLibrariesUseCaseを作成
    pub fn new(
        resolver: DependencyResolver,
        runner: Arc<dyn RepositoryOperations>,
        workspace_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            resolver,
            runner,
            workspace_root: workspace_root.into(),
            queue: BatchQueue::new(),
        }
    }

    /// 依存関係を解決してクローンキューを初期化
    ///
    /// 解決できなかったブランチのエラーを返す。解決できた分はキューに入る。
    pub async fn prepare<S: AsRef<str>>(
        &mut self,
        names: &[S],
    ) -> Result<Vec<ResolveError>, CloneLibrariesError> {
        let resolution = self.resolver.resolve(names).await?;

        for error in &resolution.errors {
            warn!("{}", error);
        }

        let targets: Vec<CloneTarget> = resolution
            .collection
            .iter()
            .map(|descriptor| CloneTarget::from_descriptor(descriptor, &self.workspace_root))
            .collect();
        info!("Queued {} libraries for cloning", targets.len());

        self.queue.init(targets);
        Ok(resolution.errors)
    }

    /// `dir` の `library.json` に書かれた依存関係でキューを初期化
    pub async fn prepare_from_version_file(
        &mut self,
        dir: &Path,
    ) -> Result<Vec<ResolveError>, CloneLibrariesError> {
        let version_file = read_version_file(dir).await?;
        info!(
            "Setting up dependencies of {} {}",
            version_file.machine_name,
            version_file.version()
        );
        self.prepare(version_file.dependencies.as_slice()).await
    }

    /// 次に処理されるクローン対象
    pub fn upcoming(&self) -> Option<&CloneTarget> {
        self.queue.peek()
    }

    /// 1件取り出してクローンする。キューが空ならNone
    pub async fn step(&mut self) -> Option<(CloneTarget, OperationResult)> {
        let target = self.queue.next()?;
        let operation = Operation::Clone {
            url: target.url.clone(),
        };
        let result = self.runner.run(&operation, &target.directory).await;
        Some((target, result))
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn total(&self) -> usize {
        self.queue.total()
    }
}
