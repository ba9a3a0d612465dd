use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Command executor errors
#[derive(Debug, Error)]
pub enum CommandExecutorError {
    #[error("Command timed out after {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Process spawn failed: {0}")]
    SpawnFailed(String),
}

/// Configuration for command execution
#[derive(Debug, Clone, Default)]
pub struct ExecutionConfig {
    /// Working directory for command execution
    pub working_directory: Option<PathBuf>,

    /// Environment variables to set for the process
    pub environment_variables: HashMap<String, String>,

    /// Timeout for command execution in seconds
    pub timeout_seconds: Option<u64>,
}

impl ExecutionConfig {
    /// Create a new execution config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set working directory
    pub fn with_working_directory<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.working_directory = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Add environment variable
    pub fn with_environment_variable(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.environment_variables.insert(key.into(), value.into());
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout_seconds: Option<u64>) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

/// Result of command execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Exit code of the process (-1 when killed by a signal)
    pub exit_code: i32,

    /// Standard output
    pub stdout: String,

    /// Standard error output
    pub stderr: String,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,

    /// Whether the command was successful (exit code 0)
    pub success: bool,
}

impl ExecutionResult {
    /// Create a new execution result
    pub fn new(exit_code: i32, stdout: String, stderr: String, execution_time_ms: u64) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            execution_time_ms,
            success: exit_code == 0,
        }
    }
}

/// Command executor for running external processes
pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute `program` with `args`, capturing both output streams.
    ///
    /// A non-zero exit code is not an error here; callers inspect
    /// [`ExecutionResult::success`] and the captured output.
    pub async fn execute<S: AsRef<str>>(
        program: &str,
        args: &[S],
        config: &ExecutionConfig,
    ) -> Result<ExecutionResult, CommandExecutorError> {
        if program.trim().is_empty() {
            return Err(CommandExecutorError::InvalidCommand(
                "Command is empty".to_string(),
            ));
        }

        let start_time = Instant::now();
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        debug!("Running {} {}", program, args.join(" "));

        let mut cmd = Command::new(program);
        cmd.args(&args);

        if let Some(working_dir) = &config.working_directory {
            cmd.current_dir(working_dir);
        }
        for (key, value) in &config.environment_variables {
            cmd.env(key, value);
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            CommandExecutorError::SpawnFailed(format!("Failed to spawn '{}': {}", program, e))
        })?;

        let output = if let Some(timeout_secs) = config.timeout_seconds {
            match timeout(Duration::from_secs(timeout_secs), child.wait_with_output()).await {
                Ok(output) => output?,
                Err(_) => {
                    return Err(CommandExecutorError::Timeout {
                        timeout_seconds: timeout_secs,
                    })
                }
            }
        } else {
            child.wait_with_output().await?
        };

        let execution_time = start_time.elapsed().as_millis() as u64;

        Ok(ExecutionResult::new(
            output.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
            execution_time,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_simple_command_execution() {
        let config = ExecutionConfig::new();
        let result = CommandExecutor::execute("echo", &["Hello, World!"], &config)
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, 0);
        assert!(result.stdout.contains("Hello, World!"));
    }

    #[tokio::test]
    async fn test_command_with_working_directory() {
        let temp_dir = TempDir::new().unwrap();
        let config = ExecutionConfig::new().with_working_directory(temp_dir.path());

        let no_args: [&str; 0] = [];
        let result = CommandExecutor::execute("pwd", &no_args, &config)
            .await
            .unwrap();

        assert!(result.success);
        let dir_name = temp_dir.path().file_name().unwrap().to_string_lossy();
        assert!(result.stdout.contains(dir_name.as_ref()));
    }

    #[tokio::test]
    async fn test_command_with_environment_variable() {
        let config = ExecutionConfig::new().with_environment_variable("TEST_VAR", "test_value");

        let no_args: [&str; 0] = [];
        let result = CommandExecutor::execute("env", &no_args, &config)
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.stdout.contains("TEST_VAR=test_value"));
    }

    #[tokio::test]
    async fn test_command_timeout() {
        let config = ExecutionConfig::new().with_timeout(Some(1));

        let result = CommandExecutor::execute("sleep", &["3"], &config).await;

        match result {
            Err(CommandExecutorError::Timeout { timeout_seconds }) => {
                assert_eq!(timeout_seconds, 1)
            }
            other => panic!("Expected timeout error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_command() {
        let no_args: [&str; 0] = [];
        let result = CommandExecutor::execute("false", &no_args, &ExecutionConfig::new())
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }

    #[tokio::test]
    async fn test_missing_program() {
        let no_args: [&str; 0] = [];
        let result =
            CommandExecutor::execute("definitely-not-a-real-binary-xyz", &no_args, &ExecutionConfig::new())
                .await;

        assert!(matches!(result, Err(CommandExecutorError::SpawnFailed(_))));
    }

    #[tokio::test]
    async fn test_empty_program() {
        let no_args: [&str; 0] = [];
        let result = CommandExecutor::execute("  ", &no_args, &ExecutionConfig::new()).await;
        assert!(matches!(result, Err(CommandExecutorError::InvalidCommand(_))));
    }

    #[test]
    fn test_execution_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = ExecutionConfig::new()
            .with_working_directory(temp_dir.path())
            .with_environment_variable("KEY", "value")
            .with_timeout(Some(30));

        assert_eq!(
            config.working_directory,
            Some(temp_dir.path().to_path_buf())
        );
        assert_eq!(
            config.environment_variables.get("KEY"),
            Some(&"value".to_string())
        );
        assert_eq!(config.timeout_seconds, Some(30));
    }
}
