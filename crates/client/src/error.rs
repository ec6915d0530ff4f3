use thiserror::Error;

/// A failed request against the MedRef REST API.
///
/// Messages are kept as strings so the error can travel inside session events and be
/// compared in tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The server answered with a non-success status. `error` is the `error` field of the
    /// JSON body when there was one.
    #[error("request failed with status {status}")]
    Status { status: u16, error: Option<String> },
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    Decode(String),
}

impl FetchError {
    /// The server-provided `error` message, if the failure carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            FetchError::Status { error, .. } => error.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Errors from the local key/value storage backing HPI drafts.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access draft storage at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode draft: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;
