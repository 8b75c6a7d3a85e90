//! Client for a self-hosted release server, plus a publisher that uploads
//! build artifacts to it.
//!
//! Everything goes through [`shipwright_http::HttpExecutor`], so any
//! [`shipwright_http::HttpTransport`] can back it.

mod client;
mod error;
mod options;
mod publisher;

pub use client::{Channel, ReleaseServerClient, ReleaseVersion, channel_for_version, content_type_for};
pub use error::{ReleaseError, Result};
pub use options::{Credentials, PASSWORD_ENV, ReleaseServerOptions, USERNAME_ENV};
pub use publisher::ReleaseServerPublisher;
