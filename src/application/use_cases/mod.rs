pub mod clone_libraries;
pub mod commit_all;
pub mod diff_all;
pub mod status_check;
pub mod update_repositories;

pub use clone_libraries::{CloneLibrariesError, CloneLibrariesUseCase, CloneTarget};
pub use commit_all::CommitAllUseCase;
pub use diff_all::{CombinedDiff, DiffAllUseCase};
pub use status_check::{StatusCheckConfig, StatusCheckUseCase, StatusReport};
pub use update_repositories::{UpdateMode, UpdateRepositoriesUseCase};
