use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpdaterError {
    #[error("Malformed version: {0}")]
    MalformedVersion(String),

    #[error("Package {0} does not exist in the update catalog")]
    UnknownPackage(String),

    #[error("Update catalog request failed: {0}")]
    Catalog(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Server binary failed: {0}")]
    ServerBinary(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, UpdaterError>;
