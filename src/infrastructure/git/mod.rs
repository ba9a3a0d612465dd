pub mod operation_runner;
pub mod output_parser;

pub use operation_runner::{
    repository_name, GitOperationRunner, GitRunnerConfig, RepositoryOperations,
    DEFAULT_SSH_COMMAND,
};
