use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to read {path}: {source}", path = path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}", path = path.display())]
    Deserialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("HPI endpoint request failed: {0}")]
    HpiRequest(#[from] reqwest::Error),
    #[error("HPI endpoint returned status {status}: {body}")]
    HpiStatus { status: u16, body: String },
    #[error("HPI endpoint returned no choices")]
    HpiEmptyResponse,
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
