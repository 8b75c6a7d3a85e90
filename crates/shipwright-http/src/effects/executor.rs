use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug, instrument};

use super::http::HttpTransport;
use crate::core::{configure_request, dump_headers, dump_request, is_json_content, is_json_path, with_json_payload};
use crate::data::{ApiResponse, ExecutorConfig, RequestBody, RequestDescriptor, TransportResponse};
use crate::error::{Error, ErrorBody, HttpError, Result};

/// Request engine on top of a pluggable [`HttpTransport`].
///
/// The executor owns redirect following, status classification and body
/// handling. It holds no per-request state, so one executor can serve any
/// number of concurrent requests and downloads.
#[derive(Debug, Clone)]
pub struct HttpExecutor<T> {
    transport: T,
    config:    ExecutorConfig,
}

impl<T: HttpTransport> HttpExecutor<T> {
    pub fn new(transport: T) -> Self { Self::with_config(transport, ExecutorConfig::default()) }

    pub fn with_config(transport: T, config: ExecutorConfig) -> Self { Self { transport, config } }

    pub fn config(&self) -> &ExecutorConfig { &self.config }

    pub fn transport(&self) -> &T { &self.transport }

    /// Issue an API request and decode the response.
    ///
    /// - 404 fails straight away with a credentials hint; the body is not read.
    /// - 204 and empty bodies give [`ApiResponse::Empty`].
    /// - A `Location` header is followed, up to `max_redirects` hops.
    /// - Status 400 and above fail with [`HttpError`] carrying the body.
    /// - JSON bodies (by content type or a `.json` path) are parsed; anything
    ///   else comes back as text.
    pub async fn request(
        &self,
        descriptor: &RequestDescriptor,
        token: Option<&CancellationToken>,
    ) -> Result<ApiResponse> {
        let configured = configure_request(descriptor, None, None, &self.config);
        self.execute(configured, RequestBody::Empty, token).await
    }

    /// Like [`HttpExecutor::request`], sending `payload` as a JSON POST body.
    pub async fn request_with_payload<P: Serialize + ?Sized>(
        &self,
        descriptor: &RequestDescriptor,
        token: Option<&CancellationToken>,
        payload: &P,
    ) -> Result<ApiResponse> {
        let configured = configure_request(descriptor, None, None, &self.config);
        let (configured, body) = with_json_payload(&configured, payload)?;
        self.execute(configured, RequestBody::Bytes(body.into()), token).await
    }

    /// Like [`HttpExecutor::request`], with a caller-supplied body. Headers
    /// describing the body (type, length) are the caller's responsibility.
    pub async fn request_with_body(
        &self,
        descriptor: &RequestDescriptor,
        token: Option<&CancellationToken>,
        body: RequestBody,
    ) -> Result<ApiResponse> {
        let configured = configure_request(descriptor, None, None, &self.config);
        self.execute(configured, body, token).await
    }

    /// [`HttpExecutor::request`] followed by deserialization into `R`.
    pub async fn request_as<R: DeserializeOwned>(
        &self,
        descriptor: &RequestDescriptor,
        token: Option<&CancellationToken>,
    ) -> Result<Option<R>> {
        self.request(descriptor, token).await?.deserialize()
    }

    async fn execute(
        &self,
        descriptor: RequestDescriptor,
        body: RequestBody,
        token: Option<&CancellationToken>,
    ) -> Result<ApiResponse> {
        let exchange = self.exchange(descriptor, body);
        match token {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(Error::Cancelled),
                result = exchange => result,
            },
            None => exchange.await,
        }
    }

    #[instrument(level = "debug", skip_all, fields(method = %descriptor.method(), url = %descriptor.to_url()))]
    async fn exchange(&self, mut descriptor: RequestDescriptor, body: RequestBody) -> Result<ApiResponse> {
        let limit = self.config.max_redirects;
        let mut redirects = 0u32;

        loop {
            let response = self
                .transport
                .send(&descriptor, body.clone())
                .await
                .map_err(Error::transport)?;

            if tracing::enabled!(Level::DEBUG) {
                debug!(
                    status = response.status,
                    request = %dump_request(&descriptor),
                    headers = %dump_headers(&response.headers),
                    "response received"
                );
            }

            if response.status == 404 {
                return Err(not_found(&descriptor, response).into());
            }
            if response.status == 204 {
                return Ok(ApiResponse::Empty);
            }

            if let Some(location) = response.location() {
                if redirects >= limit {
                    return Err(Error::TooManyRedirects { limit });
                }
                redirects += 1;
                let next = descriptor.redirect_to(location)?;
                debug!(redirects, location = %next.to_url(), "following redirect");
                descriptor = next;
                continue;
            }

            return read_response(&descriptor, response).await;
        }
    }
}

fn not_found(descriptor: &RequestDescriptor, response: TransportResponse) -> HttpError {
    let hint = format!(
        "method: {} url: {}\n\nPlease double check that your authentication token is correct. \
         Due to security reasons, actual status may be not reported, but 404.",
        descriptor.method(),
        descriptor.to_url()
    );
    HttpError::new(response.status, response.status_message, response.headers).with_description(ErrorBody::Text(hint))
}

async fn read_response(descriptor: &RequestDescriptor, response: TransportResponse) -> Result<ApiResponse> {
    let status = response.status;
    let status_message = response.status_message.clone();
    let headers = response.headers.clone();
    let is_json = is_json_content(&headers) || is_json_path(descriptor.path());

    let text = response.text().await?;

    if status >= 400 {
        let description = if is_json {
            serde_json::from_str(&text)
                .map(ErrorBody::Json)
                .unwrap_or_else(|_| ErrorBody::Text(text))
        } else {
            ErrorBody::Text(text)
        };
        return Err(HttpError::new(status, status_message, headers)
            .with_description(description)
            .into());
    }

    if text.is_empty() {
        Ok(ApiResponse::Empty)
    } else if is_json {
        Ok(ApiResponse::Json(serde_json::from_str(&text)?))
    } else {
        Ok(ApiResponse::Text(text))
    }
}
