use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Upstream error (status {status:?}): {details}")]
    Upstream {
        status: Option<u16>,
        details: Value,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// HTTP status a gateway responds with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Upstream { status: Some(status), .. } => *status,
            Error::Http(e) => e.status().map(|s| s.as_u16()).unwrap_or(500),
            _ => 500,
        }
    }

    /// Payload reported as `details` in gateway error bodies.
    pub fn details(&self) -> Value {
        match self {
            Error::Upstream { details, .. } => details.clone(),
            other => Value::String(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
