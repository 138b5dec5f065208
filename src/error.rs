use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for dataset release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Invalid dataset name: {0}")]
    DatasetName(String),

    #[error("Dataset '{dataset}' not found at {}", path.display())]
    DatasetNotFound { dataset: String, path: PathBuf },

    #[error("No data files found for dataset '{dataset}' in {}", path.display())]
    NoFilesFound { dataset: String, path: PathBuf },

    #[error("No datasets found in {}", .0.display())]
    NoDatasets(PathBuf),

    #[error("Deployment failed: {0}")]
    Deploy(String),

    #[error("Packaging failed: {0}")]
    Package(String),

    #[error("Release publication failed: {0}")]
    Publish(String),
}

/// Convenience type alias for Results in dataset-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ReleaseError::Version(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        ReleaseError::Tag(msg.into())
    }

    pub fn dataset_name(msg: impl Into<String>) -> Self {
        ReleaseError::DatasetName(msg.into())
    }

    pub fn package(msg: impl Into<String>) -> Self {
        ReleaseError::Package(msg.into())
    }

    pub fn deploy(msg: impl Into<String>) -> Self {
        ReleaseError::Deploy(msg.into())
    }

    pub fn publish(msg: impl Into<String>) -> Self {
        ReleaseError::Publish(msg.into())
    }
}
