use super::output_parser;
use crate::domain::entities::{
    Operation, OperationError, OperationOutcome, OperationResult,
};
use crate::infrastructure::process::{
    CommandExecutor, CommandExecutorError, ExecutionConfig, ExecutionResult,
};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, warn};

/// Default SSH command; never prompts, so a missing host key fails instead of hanging.
pub const DEFAULT_SSH_COMMAND: &str = "ssh -o BatchMode=yes";

/// Runs a single version-control operation against one repository directory
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositoryOperations: Send + Sync {
    /// Execute `operation` in (or, for clone, into) `directory`.
    ///
    /// Never fails as a whole: every problem is reported inside the
    /// returned [`OperationResult`].
    async fn run(&self, operation: &Operation, directory: &Path) -> OperationResult;
}

/// Settings for the git subprocess
#[derive(Debug, Clone)]
pub struct GitRunnerConfig {
    /// git executable name or path
    pub git_executable: String,
    /// Value pinned into `GIT_SSH_COMMAND`
    pub ssh_command: String,
    /// Per-invocation timeout
    pub timeout_seconds: Option<u64>,
}

impl Default for GitRunnerConfig {
    fn default() -> Self {
        Self {
            git_executable: "git".to_string(),
            ssh_command: DEFAULT_SSH_COMMAND.to_string(),
            timeout_seconds: None,
        }
    }
}

/// [`RepositoryOperations`] backed by the git command line
#[derive(Debug, Clone, Default)]
pub struct GitOperationRunner {
    config: GitRunnerConfig,
}

impl GitOperationRunner {
    /// Create a runner with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runner with explicit settings
    pub fn with_config(config: GitRunnerConfig) -> Self {
        Self { config }
    }

    fn execution_config(&self, working_dir: Option<&Path>) -> ExecutionConfig {
        let mut config = ExecutionConfig::new()
            .with_environment_variable("GIT_SSH_COMMAND", &self.config.ssh_command)
            .with_environment_variable("GIT_TERMINAL_PROMPT", "0")
            .with_environment_variable("LC_ALL", "C")
            .with_timeout(self.config.timeout_seconds);
        if let Some(dir) = working_dir {
            config = config.with_working_directory(dir);
        }
        config
    }

    async fn git(
        &self,
        args: &[&str],
        working_dir: Option<&Path>,
    ) -> Result<ExecutionResult, OperationError> {
        let config = self.execution_config(working_dir);
        CommandExecutor::execute(&self.config.git_executable, args, &config)
            .await
            .map_err(process_error)
    }

    async fn remote_url(&self, directory: &Path) -> Option<String> {
        let result = self
            .git(&["config", "--get", "remote.origin.url"], Some(directory))
            .await
            .ok()?;
        let url = result.stdout.trim();
        (result.success && !url.is_empty()).then(|| url.to_string())
    }

    async fn clone_into(&self, url: &str, directory: &Path) -> Result<OperationOutcome, OperationError> {
        let dest = directory.to_string_lossy();
        let result = self.git(&["clone", url, dest.as_ref()], None).await?;
        output_parser::parse_clone(&result, url)
    }

    async fn status(&self, directory: &Path) -> Result<OperationOutcome, OperationError> {
        let result = self
            .git(&["status", "--porcelain", "-b"], Some(directory))
            .await?;
        output_parser::parse_status(&result)
    }

    async fn commit(
        &self,
        directory: &Path,
        message: &str,
    ) -> Result<OperationOutcome, OperationError> {
        let staged = self.git(&["add", "-A"], Some(directory)).await?;
        if let Some(error) = output_parser::check_staging(&staged) {
            return Err(error);
        }

        let result = self
            .git(&["commit", "-m", message], Some(directory))
            .await?;
        output_parser::parse_commit(&result)
    }

    async fn pull(&self, directory: &Path) -> Result<OperationOutcome, OperationError> {
        let result = self.git(&["pull"], Some(directory)).await?;
        if result.success {
            return output_parser::parse_pull(&result, None);
        }
        let remote = self.remote_url(directory).await;
        output_parser::parse_pull(&result, remote.as_deref())
    }

    async fn push(&self, directory: &Path) -> Result<OperationOutcome, OperationError> {
        let result = self.git(&["push"], Some(directory)).await?;
        if result.success {
            return output_parser::parse_push(&result, None);
        }
        let remote = self.remote_url(directory).await;
        output_parser::parse_push(&result, remote.as_deref())
    }

    async fn diff(&self, directory: &Path, name: &str) -> Result<OperationOutcome, OperationError> {
        let result = self
            .git(
                &["-c", "core.quotePath=false", "diff", "--no-color", "--no-ext-diff"],
                Some(directory),
            )
            .await?;
        output_parser::parse_diff(&result, name)
    }
}

#[async_trait]
impl RepositoryOperations for GitOperationRunner {
    async fn run(&self, operation: &Operation, directory: &Path) -> OperationResult {
        let name = repository_name(directory);
        debug!("git {} in {}", operation.kind(), directory.display());

        let outcome = match operation {
            Operation::Clone { url } => self.clone_into(url, directory).await,
            Operation::Status => self.status(directory).await,
            Operation::Commit { message } => self.commit(directory, message).await,
            Operation::Pull => self.pull(directory).await,
            Operation::Push => self.push(directory).await,
            Operation::Diff => self.diff(directory, &name).await,
        };

        if let Err(error) = &outcome {
            warn!("{} failed for {}: {}", operation.kind(), name, error);
        }

        OperationResult::new(name, operation.kind(), outcome)
    }
}

/// Directory name used as the repository name in results and diffs
pub fn repository_name(directory: &Path) -> String {
    directory
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| directory.display().to_string())
}

fn process_error(error: CommandExecutorError) -> OperationError {
    OperationError::Process {
        message: error.to_string(),
    }
}
