use crate::domain::entities::VersionFile;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the per-repository version manifest
pub const VERSION_FILE_NAME: &str = "library.json";

#[derive(Debug, Error)]
pub enum VersionFileError {
    #[error("No {file} found in {dir}")]
    NotFound { file: &'static str, dir: PathBuf },

    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid version file {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read `library.json` from `dir`
pub async fn read_version_file(dir: &Path) -> Result<VersionFile, VersionFileError> {
    let path = dir.join(VERSION_FILE_NAME);

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(VersionFileError::NotFound {
                file: VERSION_FILE_NAME,
                dir: dir.to_path_buf(),
            })
        }
        Err(source) => return Err(VersionFileError::ReadFailed { path, source }),
    };

    serde_json::from_str(&content).map_err(|source| VersionFileError::Invalid { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_version_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(VERSION_FILE_NAME),
            r#"{
                "machineName": "H5P.Column",
                "majorVersion": 1,
                "minorVersion": 16,
                "patchVersion": 4,
                "dependencies": ["H5P.Text", "H5P.Image"],
                "title": "Column"
            }"#,
        )
        .unwrap();

        let file = read_version_file(temp_dir.path()).await.unwrap();
        assert_eq!(file.machine_name, "H5P.Column");
        assert_eq!(file.version(), "1.16.4");
        assert_eq!(file.dependencies, vec!["H5P.Text", "H5P.Image"]);
    }

    #[tokio::test]
    async fn test_missing_version_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = read_version_file(temp_dir.path()).await;
        assert!(matches!(result, Err(VersionFileError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_invalid_version_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(VERSION_FILE_NAME), "{\"machineName\": 3}").unwrap();

        let result = read_version_file(temp_dir.path()).await;
        assert!(matches!(result, Err(VersionFileError::Invalid { .. })));
    }
}
