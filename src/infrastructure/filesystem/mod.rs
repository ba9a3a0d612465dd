pub mod config_store;
pub mod repository_scanner;
pub mod version_file;

pub use config_store::{ConfigStore, ConfigStoreError, WorkspaceConfig, CONFIG_FILE_NAME};
pub use repository_scanner::RepositoryScanner;
pub use version_file::{read_version_file, VersionFileError, VERSION_FILE_NAME};
