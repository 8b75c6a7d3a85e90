use std::fmt;
use std::io;
use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt, stream};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::headers::Headers;
use crate::error::Result;

/// A boxed stream type for response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Response body as delivered by a transport.
pub type BodyStream = BoxStream<'static, io::Result<Bytes>>;

/// Raw response handed back by an [`HttpTransport`](crate::HttpTransport).
pub struct TransportResponse {
    pub status:         u16,
    pub status_message: String,
    pub headers:        Headers,
    pub body:           BodyStream,
}

impl TransportResponse {
    pub fn new(status: u16, status_message: impl Into<String>, headers: Headers, body: BodyStream) -> Self {
        Self {
            status,
            status_message: status_message.into(),
            headers,
            body,
        }
    }

    /// Response whose body is already in memory.
    pub fn from_bytes(
        status: u16,
        status_message: impl Into<String>,
        headers: Headers,
        body: impl Into<Bytes>,
    ) -> Self {
        let body = body.into();
        let stream: BodyStream = if body.is_empty() {
            Box::pin(stream::empty())
        } else {
            Box::pin(stream::iter([Ok(body)]))
        };
        Self::new(status, status_message, headers, stream)
    }

    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get("content-length")
            .and_then(|value| value.trim().parse().ok())
    }

    pub fn location(&self) -> Option<&str> { self.headers.get("location") }

    /// Drain the body into memory.
    pub async fn bytes(self) -> Result<Bytes> {
        let mut body = self.body;
        let mut buffer = BytesMut::new();
        while let Some(chunk) = body.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        Ok(buffer.freeze())
    }

    /// Drain the body and decode it as UTF-8, replacing invalid sequences.
    pub async fn text(self) -> Result<String> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("status_message", &self.status_message)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Decoded result of an API request.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ApiResponse {
    #[default]
    Empty,
    Json(Value),
    Text(String),
}

impl ApiResponse {
    pub fn is_empty(&self) -> bool { matches!(self, ApiResponse::Empty) }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ApiResponse::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ApiResponse::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Deserialize a JSON response into `R`. Empty responses give `None`;
    /// text responses are parsed as JSON.
    pub fn deserialize<R: DeserializeOwned>(&self) -> Result<Option<R>> {
        match self {
            ApiResponse::Empty => Ok(None),
            ApiResponse::Json(value) => Ok(Some(R::deserialize(value)?)),
            ApiResponse::Text(text) => Ok(Some(serde_json::from_str(text)?)),
        }
    }
}
