//! I/O: the transport abstraction and the executor built on it.

mod download;
mod executor;
mod http;

pub use executor::HttpExecutor;
pub use http::HttpTransport;

#[cfg(feature = "reqwest")]
pub use http::{ReqwestTransport, ReqwestTransportError};
