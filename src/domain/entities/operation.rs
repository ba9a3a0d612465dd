use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// 1つのリポジトリに対して実行する操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// 指定URLからクローン
    Clone { url: String },
    /// 作業ツリーの状態を取得
    Status,
    /// 全変更をステージしてコミット
    Commit { message: String },
    /// リモートから取り込み
    Pull,
    /// リモートへ送信
    Push,
    /// 差分を取得
    Diff,
}

impl Operation {
    /// 操作の種類
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Clone { .. } => OperationKind::Clone,
            Operation::Status => OperationKind::Status,
            Operation::Commit { .. } => OperationKind::Commit,
            Operation::Pull => OperationKind::Pull,
            Operation::Push => OperationKind::Push,
            Operation::Diff => OperationKind::Diff,
        }
    }
}

/// 操作の種類（ペイロードなし）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Clone,
    Status,
    Commit,
    Pull,
    Push,
    Diff,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Clone => "clone",
            OperationKind::Status => "status",
            OperationKind::Commit => "commit",
            OperationKind::Pull => "pull",
            OperationKind::Push => "push",
            OperationKind::Diff => "diff",
        };
        f.write_str(name)
    }
}

/// 操作の成功結果
///
/// `AlreadyExists` / `NothingToCommit` / `UpToDate` / `NoOp` は
/// 生の出力では失敗に見えるが成功として扱う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OperationOutcome {
    Cloned,
    AlreadyExists,
    Status { branch: String, changes: Vec<String> },
    Committed { summary: String },
    NothingToCommit,
    Pulled,
    UpToDate,
    Pushed { summary: String },
    NoOp,
    Diff { patch: String },
}

impl OperationOutcome {
    /// 何も変更しなかった結果か
    pub fn is_unchanged(&self) -> bool {
        matches!(
            self,
            OperationOutcome::AlreadyExists
                | OperationOutcome::NothingToCommit
                | OperationOutcome::UpToDate
                | OperationOutcome::NoOp
        )
    }
}

impl fmt::Display for OperationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationOutcome::Cloned => f.write_str("cloned"),
            OperationOutcome::AlreadyExists => f.write_str("already exists"),
            OperationOutcome::Status { branch, changes } if changes.is_empty() => {
                write!(f, "{} (clean)", branch)
            }
            OperationOutcome::Status { branch, changes } => {
                write!(f, "{} ({} changed)", branch, changes.len())
            }
            OperationOutcome::Committed { summary } => f.write_str(summary),
            OperationOutcome::NothingToCommit => f.write_str("nothing to commit"),
            OperationOutcome::Pulled => f.write_str("updated from remote"),
            OperationOutcome::UpToDate => f.write_str("already up to date"),
            OperationOutcome::Pushed { summary } => f.write_str(summary),
            OperationOutcome::NoOp => f.write_str("everything up to date"),
            OperationOutcome::Diff { patch } if patch.is_empty() => f.write_str("no changes"),
            OperationOutcome::Diff { .. } => f.write_str("diff"),
        }
    }
}

/// 正規化済みの操作エラー
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum OperationError {
    #[error("Authentication to {host} failed. Check that your SSH key is loaded and has access")]
    Auth { host: String },

    #[error("Host key verification for {host} failed. Run `ssh -T git@{host}` once to verify it manually")]
    HostVerification { host: String },

    #[error("Staging changes failed with exit code {exit_code}: {message}")]
    StagingFailed { exit_code: i32, message: String },

    #[error("{message}")]
    Failed { message: String },

    #[error("Could not run git: {message}")]
    Process { message: String },
}

/// 1リポジトリ分の操作結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationResult {
    /// リポジトリ名
    pub repository: String,

    /// 操作の種類
    pub kind: OperationKind,

    /// 成功時の結果または正規化済みエラー
    pub outcome: Result<OperationOutcome, OperationError>,
}

impl OperationResult {
    pub fn new(
        repository: impl Into<String>,
        kind: OperationKind,
        outcome: Result<OperationOutcome, OperationError>,
    ) -> Self {
        Self {
            repository: repository.into(),
            kind,
            outcome,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn error(&self) -> Option<&OperationError> {
        self.outcome.as_ref().err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_kind() {
        let op = Operation::Commit {
            message: "wip".to_string(),
        };
        assert_eq!(op.kind(), OperationKind::Commit);
        assert_eq!(op.kind().to_string(), "commit");
    }

    #[test]
    fn test_unchanged_outcomes() {
        assert!(OperationOutcome::AlreadyExists.is_unchanged());
        assert!(OperationOutcome::NoOp.is_unchanged());
        assert!(!OperationOutcome::Cloned.is_unchanged());
    }

    #[test]
    fn test_host_verification_message_names_host() {
        let error = OperationError::HostVerification {
            host: "github.com".to_string(),
        };
        assert!(error.to_string().contains("ssh -T git@github.com"));
    }

    #[test]
    fn test_result_accessors() {
        let failed = OperationResult::new(
            "h5p-text",
            OperationKind::Pull,
            Err(OperationError::Failed {
                message: "boom".to_string(),
            }),
        );
        assert!(!failed.is_success());
        assert_eq!(failed.error().unwrap().to_string(), "boom");
    }
}
