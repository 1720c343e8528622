use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("image not found: {name}")]
    NotFound { name: String },
    #[error("no more images on this page")]
    NoMoreResults { page: i64 },
    #[error("unknown label: {name}")]
    UnknownLabel { name: String },
    #[error("could not move image: {source}")]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not write label file {path:?}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not read image directory {path:?}: {source}")]
    EnumerationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
