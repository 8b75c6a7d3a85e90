//! Error types for shipwright-http.

use std::fmt;
use std::io;
use std::time::Duration;

use serde_json::Value;
use shipwright_verify::VerifyError;
use thiserror::Error;

use crate::data::Headers;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported protocol: {0}")]
    UnsupportedProtocol(String),

    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("cannot download \"{url}\", status {status}: {message}")]
    DownloadStatus { url: String, status: u16, message: String },

    #[error("too many redirects (> {limit})")]
    TooManyRedirects { limit: u32 },

    #[error("no data received for {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("X-Checksum-Sha2 header mismatch, expected {expected}, got {actual}")]
    ChecksumHeaderMismatch { expected: String, actual: String },

    #[error(transparent)]
    Digest(#[from] VerifyError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    pub(crate) fn transport<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
        Error::Transport(Box::new(err))
    }

    /// HTTP status code, for errors that carry one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http(err) => Some(err.status),
            Error::DownloadStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Body of a failed API response.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    Json(Value),
    Text(String),
}

/// Non-success status returned by an API endpoint.
#[derive(Debug, Clone)]
pub struct HttpError {
    pub status:         u16,
    pub status_message: String,
    pub headers:        Headers,
    pub description:    Option<ErrorBody>,
}

impl HttpError {
    pub fn new(status: u16, status_message: impl Into<String>, headers: Headers) -> Self {
        Self {
            status,
            status_message: status_message.into(),
            headers,
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: ErrorBody) -> Self {
        self.description = Some(description);
        self
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.status_message)?;
        match &self.description {
            Some(ErrorBody::Json(value)) => {
                let pretty = serde_json::to_string_pretty(value).map_err(|_| fmt::Error)?;
                write!(f, "\n{pretty}")?;
            }
            Some(ErrorBody::Text(text)) if !text.is_empty() => write!(f, "\n{text}")?,
            _ => {}
        }
        let headers = serde_json::to_string_pretty(&self.headers).map_err(|_| fmt::Error)?;
        write!(f, "\nHeaders: {headers}")
    }
}

impl std::error::Error for HttpError {}
