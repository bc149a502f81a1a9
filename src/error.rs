//! Defines the custom error type for the `sandeul-cleaner` crate.

use thiserror::Error;

/// Message shown when the service rejects a request without a usable reason.
pub const GENERIC_FAILURE_MESSAGE: &str = "요청 처리 중 오류가 발생했습니다.";

/// The main error type for the `sandeul-cleaner` crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response; `message` is the best human-readable reason found.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("response decoding failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("private key import failed: {0}")]
    KeyImport(String),

    #[error("no cryptographic backend is available for decryption")]
    CryptoUnavailable,

    #[error("no files selected for generation {0}")]
    NoFilesSelected(u32),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status carried by an [`Error::Api`], if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::KeyImport(format!("base64 decoding failed: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
