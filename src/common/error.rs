use std::path::PathBuf;
use thiserror::Error;

/// Failures of workspace-level operations that are not tied to one repository
#[derive(Error, Debug)]
pub enum LibwsError {
    #[error("File system operation failed: {message}")]
    FileSystemError {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    #[error("Validation error: {field} - {message}")]
    ValidationError { field: String, message: String },
}

impl LibwsError {
    pub fn filesystem_error_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystemError {
            message: message.into(),
            path,
            source,
        }
    }

    pub fn validation_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}
