//! Error types for shipwright-release.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Failures are cheap to clone so one authentication failure can be handed
/// to every caller waiting on it.
#[derive(Debug, Clone, Error)]
pub enum ReleaseError {
    #[error("{field} is not set, neither programmatically, nor using env \"{variable}\"")]
    MissingCredential {
        field:    &'static str,
        variable: &'static str,
    },

    #[error("invalid release server address: {0}")]
    InvalidServer(#[source] Arc<shipwright_http::Error>),

    #[error("could not authenticate with release server")]
    Authentication(#[source] Arc<shipwright_http::Error>),

    #[error("release server login returned no token")]
    MissingToken,

    #[error("could not get versions")]
    ListVersions(#[source] Arc<shipwright_http::Error>),

    #[error("could not create version {version}")]
    CreateVersion {
        version: String,
        #[source]
        source:  Arc<shipwright_http::Error>,
    },

    #[error("could not upload asset {}", file.display())]
    Upload {
        file:   PathBuf,
        #[source]
        source: Arc<shipwright_http::Error>,
    },
}

pub type Result<T> = std::result::Result<T, ReleaseError>;
