use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification used when errors cross the operation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    InvalidInput,
    NotFound,
    Internal,
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid bundle source '{0}': {1}")]
    InvalidSource(String, String),
    #[error("Fetch timeout must be greater than zero")]
    InvalidTimeout,
    #[error("Bundle source unreachable: {0}")]
    SourceUnreachable(String),
    #[error("Bundle source rejected the request with status {status}")]
    SourceRejected { status: u16 },
    #[error("Bundle download timed out after {0:?}")]
    Timeout(std::time::Duration),
}

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),
    #[error("Invalid bundle: {0}")]
    InvalidBundle(String),
    #[error("No documentation available at {0} and no bundle URL configured")]
    NoDocumentationAvailable(PathBuf),
    #[error("Provisioning is already running")]
    AlreadyRunning,
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
}

/// Index errors are memoized for the lifetime of an index cell, hence `Clone`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("Index file missing: {0}")]
    IndexMissing(PathBuf),
    #[error("Index file corrupt: {0}")]
    IndexCorrupt(String),
}

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Search query must not be empty")]
    EmptyQuery,
    #[error("Class name must not be empty")]
    EmptyName,
    #[error("No documentation found for '{0}'")]
    NameNotFound(String),
    #[error("Documentation for '{name}' is indexed but its file is missing: {path}")]
    DocumentBodyMissing { name: String, path: PathBuf },
    #[error("Documentation index unavailable: {0}")]
    Index(#[from] IndexError),
}

impl QueryError {
    pub fn class(&self) -> ErrorClass {
        match self {
            QueryError::EmptyQuery | QueryError::EmptyName => ErrorClass::InvalidInput,
            QueryError::NameNotFound(_) => ErrorClass::NotFound,
            QueryError::DocumentBodyMissing { .. } | QueryError::Index(_) => ErrorClass::Internal,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("fetch_timeout_secs must be greater than zero")]
    InvalidTimeout,
    #[error("store_root {0} must name a directory inside a parent directory")]
    InvalidStoreRoot(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_classes() {
        assert_eq!(QueryError::EmptyQuery.class(), ErrorClass::InvalidInput);
        assert_eq!(QueryError::EmptyName.class(), ErrorClass::InvalidInput);
        assert_eq!(
            QueryError::NameNotFound("a.Foo".to_string()).class(),
            ErrorClass::NotFound
        );
        assert_eq!(
            QueryError::DocumentBodyMissing {
                name: "a.Foo".to_string(),
                path: PathBuf::from("f1"),
            }
            .class(),
            ErrorClass::Internal
        );
        assert_eq!(
            QueryError::Index(IndexError::IndexCorrupt("bad".to_string())).class(),
            ErrorClass::Internal
        );
    }
}
