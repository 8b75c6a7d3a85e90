#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::Poll;

use bytes::Bytes;
use futures_util::stream;
use shipwright_http::{BodyStream, Headers, HttpTransport, RequestBody, RequestDescriptor, TransportResponse};

#[derive(Debug, thiserror::Error)]
#[error("mock transport failure: {0}")]
pub struct MockError(pub String);

/// What the mock does for one request.
pub enum Reply {
    Respond(TransportResponse),
    Fail(String),
    Hang,
}

/// A request as the mock saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub descriptor: RequestDescriptor,
    pub body:       Option<Bytes>,
    pub body_len:   u64,
}

type Handler = dyn Fn(&RequestDescriptor, usize) -> Reply + Send + Sync;

/// Transport that answers from a closure and records every request.
pub struct MockTransport {
    handler:  Box<Handler>,
    requests: Mutex<Vec<Recorded>>,
}

impl MockTransport {
    /// `handler` receives the descriptor and the zero-based attempt number.
    pub fn new(handler: impl Fn(&RequestDescriptor, usize) -> Reply + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            handler:  Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<Recorded> { self.requests.lock().unwrap().clone() }

    pub fn attempts(&self) -> usize { self.requests.lock().unwrap().len() }
}

impl HttpTransport for MockTransport {
    type Error = MockError;

    async fn send(&self, descriptor: &RequestDescriptor, body: RequestBody) -> Result<TransportResponse, MockError> {
        let body_len = body.len();
        let body = match body {
            RequestBody::Bytes(bytes) => Some(bytes),
            RequestBody::File { path, .. } => Some(Bytes::from(tokio::fs::read(path).await.unwrap())),
            RequestBody::Empty => None,
        };

        let attempt = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(Recorded {
                descriptor: descriptor.clone(),
                body,
                body_len,
            });
            requests.len() - 1
        };

        match (self.handler)(descriptor, attempt) {
            Reply::Respond(response) => Ok(response),
            Reply::Fail(message) => Err(MockError(message)),
            Reply::Hang => std::future::pending().await,
        }
    }
}

pub fn respond(status: u16, headers: Headers, body: impl Into<Bytes>) -> Reply {
    Reply::Respond(TransportResponse::from_bytes(status, reason(status), headers, body))
}

pub fn json(status: u16, body: &str) -> Reply {
    respond(
        status,
        Headers::new().with("Content-Type", "application/json"),
        body.to_string(),
    )
}

pub fn redirect(location: &str) -> Reply { respond(302, Headers::new().with("Location", location), Bytes::new()) }

/// Binary body split into chunks, with Content-Length set.
pub fn chunked(data: &[u8], chunk_size: usize, headers: Headers) -> Reply {
    let chunks: Vec<io::Result<Bytes>> = data
        .chunks(chunk_size)
        .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
        .collect();
    let headers = headers.with("Content-Length", data.len().to_string());
    Reply::Respond(TransportResponse::new(200, "OK", headers, Box::pin(stream::iter(chunks))))
}

/// Body that sends `head` and then never produces another chunk.
pub fn stalled(head: &'static [u8], headers: Headers) -> Reply {
    let first = stream::iter([Ok(Bytes::from_static(head))]);
    let body: BodyStream = Box::pin(futures_util::StreamExt::chain(first, stream::pending()));
    Reply::Respond(TransportResponse::new(200, "OK", headers, body))
}

/// Body that records whether anyone polled it.
pub fn watched(status: u16, polled: Arc<AtomicBool>) -> Reply {
    let body: BodyStream = Box::pin(stream::poll_fn(move |_| {
        polled.store(true, Ordering::SeqCst);
        Poll::Ready(None)
    }));
    Reply::Respond(TransportResponse::new(status, reason(status), Headers::new(), body))
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        302 => "Found",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "",
    }
}
