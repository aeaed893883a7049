use spoolyard_ids::GraphViolation;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request never produced a response (connect, timeout, TLS).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("server returned {status}: {body}")]
    Transport { status: u16, body: String },

    #[error(transparent)]
    Identifier(#[from] GraphViolation),

    #[error("response body did not match the expected model: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("contract violated: {0}")]
    Contract(String),
}

impl ClientError {
    /// HTTP status for `Transport` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}
