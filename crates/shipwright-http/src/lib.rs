//! HTTP transport engine for build and release tooling.
//!
//! # Architecture
//!
//! - [`data`] - immutable request, response and option types
//! - [`core`] - pure request normalization and response classification
//! - `effects` - the [`HttpTransport`] abstraction and the [`HttpExecutor`]
//!   built on it
//! - [`transform`] - stages a download body passes through on its way to disk
//!
//! The executor never talks to the network itself. It issues one request at a
//! time through a transport, follows redirects, classifies status codes, and
//! for downloads pipes the body through checksum and progress stages into a
//! file.
//!
//! # Example
//!
//! ```no_run
//! use shipwright_http::{DownloadOptions, HttpExecutor, RequestDescriptor, ReqwestTransport};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = HttpExecutor::new(ReqwestTransport::new()?);
//! let descriptor = RequestDescriptor::parse("https://example.com/app-1.0.0.zip")?;
//!
//! let options = DownloadOptions::default().sha2("9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08");
//! executor.download(&descriptor, "out/app.zip", &options).await?;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod data;
mod effects;
mod error;
mod lazy;
pub mod transform;

pub use crate::core::{configure_request, dump_request};
pub use data::{
    ApiResponse, BodyStream, BoxStream, DownloadOptions, DownloadOutcome, ExecutorConfig, Headers, Method,
    PartialFilePolicy, Progress, Protocol, RequestBody, RequestDescriptor, TransportResponse,
};
pub use effects::{HttpExecutor, HttpTransport};
#[cfg(feature = "reqwest")]
pub use effects::{ReqwestTransport, ReqwestTransportError};
pub use error::{Error, ErrorBody, HttpError, Result};
pub use lazy::Lazy;
pub use tokio_util::sync::CancellationToken;
