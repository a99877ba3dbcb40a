use reqwest::StatusCode;
use thiserror::Error;

/// Connection-level failures reported by a [`Transport`](crate::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected response status {0}")]
    Status(StatusCode),
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Per-record failures raised while extracting or decoding records.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed record: {0}")]
    MalformedSyntax(#[from] serde_json::Error),
    #[error("missing required field `{0}`")]
    MissingField(String),
    /// No record boundary was found within the pending byte limit.
    #[error("no complete record within {limit} pending bytes")]
    Overflow { limit: usize },
}

impl DecodeError {
    /// Whether the stream can no longer make progress after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DecodeError::Overflow { .. })
    }
}

/// Terminal failure of a [`Connection`](crate::Connection).
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
