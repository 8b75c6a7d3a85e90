use std::future::Future;
use std::sync::Arc;

use crate::data::{RequestBody, RequestDescriptor, TransportResponse};

/// Low-level request primitive the executor is built on.
///
/// Implementations send exactly one request and hand back the raw response.
/// They must not follow redirects or interpret status codes; the executor owns
/// that policy.
///
/// # Implementations
///
/// - [`ReqwestTransport`]: production implementation using `reqwest`
/// - in-memory mocks for testing
pub trait HttpTransport: Send + Sync {
    /// Error type for transport failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send `descriptor` with `body` and return the response head and body
    /// stream.
    fn send(
        &self,
        descriptor: &RequestDescriptor,
        body: RequestBody,
    ) -> impl Future<Output = Result<TransportResponse, Self::Error>> + Send;
}

impl<T: HttpTransport> HttpTransport for Arc<T> {
    type Error = T::Error;

    fn send(
        &self,
        descriptor: &RequestDescriptor,
        body: RequestBody,
    ) -> impl Future<Output = Result<TransportResponse, Self::Error>> + Send {
        (**self).send(descriptor, body)
    }
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::io;

    use futures_util::StreamExt;
    use reqwest::redirect::Policy;
    use tokio_util::io::ReaderStream;

    use super::*;
    use crate::data::{Headers, Method};

    #[derive(Debug, thiserror::Error)]
    pub enum ReqwestTransportError {
        #[error(transparent)]
        Http(#[from] reqwest::Error),

        #[error("cannot read request body: {0}")]
        Body(#[from] io::Error),
    }

    /// Production transport on top of `reqwest`, with automatic redirects
    /// turned off.
    #[derive(Debug, Clone)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new() -> Result<Self, ReqwestTransportError> {
            let client = reqwest::Client::builder().redirect(Policy::none()).build()?;
            Ok(Self { client })
        }
    }

    fn method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }

    impl HttpTransport for ReqwestTransport {
        type Error = ReqwestTransportError;

        async fn send(
            &self,
            descriptor: &RequestDescriptor,
            body: RequestBody,
        ) -> Result<TransportResponse, Self::Error> {
            let mut request = self.client.request(method(descriptor.method()), descriptor.to_url());

            for (name, value) in descriptor.headers().iter() {
                request = request.header(name, value);
            }

            request = match body {
                RequestBody::Empty => request,
                RequestBody::Bytes(bytes) => request.body(bytes),
                RequestBody::File { path, .. } => {
                    let file = tokio::fs::File::open(&path).await?;
                    request.body(reqwest::Body::wrap_stream(ReaderStream::new(file)))
                }
            };

            let response = request.send().await?;

            let status = response.status();
            let headers: Headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| value.to_str().ok().map(|value| (name.as_str(), value)))
                .collect();
            let body = response.bytes_stream().map(|chunk| chunk.map_err(io::Error::other));

            Ok(TransportResponse::new(
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
                headers,
                Box::pin(body),
            ))
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::{ReqwestTransport, ReqwestTransportError};
