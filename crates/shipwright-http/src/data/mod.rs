pub mod config;
pub mod headers;
pub mod options;
pub mod progress;
pub mod request;
pub mod response;

pub use config::ExecutorConfig;
pub use headers::Headers;
pub use options::{DownloadOptions, DownloadOutcome, PartialFilePolicy};
pub use progress::Progress;
pub use request::{Method, Protocol, RequestBody, RequestDescriptor};
pub use response::{ApiResponse, BodyStream, BoxStream, TransportResponse};
