/// Infrastructure layer modules
///
/// This layer provides concrete implementations for external system interactions:
/// - Registry access (HTTP or local catalog file)
/// - Git operations (clone, status, commit, pull, push, diff)
/// - File system operations (workspace scan, config and version files)
/// - Process execution
pub mod filesystem;
pub mod git;
pub mod process;
pub mod registry;

// Re-export commonly used types
pub use filesystem::{ConfigStore, RepositoryScanner, WorkspaceConfig};
pub use git::{GitOperationRunner, GitRunnerConfig, RepositoryOperations};
pub use process::CommandExecutor;
pub use registry::{RegistryClient, RegistryClientConfig, RegistryError, RegistrySource, StaticRegistry};
