use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shipwright_http::{
    ApiResponse, CancellationToken, HttpExecutor, HttpTransport, Method, Protocol, RequestBody,
};
use tracing::{debug, instrument};

use crate::error::{ReleaseError, Result};
use crate::options::{Credentials, ReleaseServerOptions};

/// Release channel a version is published to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Stable,
    Beta,
    Alpha,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Stable => "stable",
            Channel::Beta => "beta",
            Channel::Alpha => "alpha",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Pick the channel from the version string: `alpha` beats `beta`, anything
/// else is `stable`.
pub fn channel_for_version(version: &str) -> Channel {
    if version.contains("alpha") {
        Channel::Alpha
    } else if version.contains("beta") {
        Channel::Beta
    } else {
        Channel::Stable
    }
}

/// A version as listed by the server. Only the name is relied upon.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReleaseVersion {
    pub name:  String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

#[derive(Serialize)]
struct ChannelRef {
    name: Channel,
}

#[derive(Serialize)]
struct NewVersion<'a> {
    channel: ChannelRef,
    name:    &'a str,
    notes:   &'a str,
}

/// Client for the release server's REST API.
pub struct ReleaseServerClient<T> {
    executor:    Arc<HttpExecutor<T>>,
    options:     ReleaseServerOptions,
    credentials: Credentials,
}

impl<T> fmt::Debug for ReleaseServerClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseServerClient")
            .field("url", &self.options.url)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl<T: HttpTransport> ReleaseServerClient<T> {
    pub fn new(executor: Arc<HttpExecutor<T>>, options: ReleaseServerOptions, credentials: Credentials) -> Self {
        Self {
            executor,
            options,
            credentials,
        }
    }

    pub fn options(&self) -> &ReleaseServerOptions { &self.options }

    /// Log in and return the session token.
    #[instrument(skip(self, cancel), fields(server = %self.options.url))]
    pub async fn authenticate(&self, cancel: Option<&CancellationToken>) -> Result<String> {
        let endpoint = self.options.endpoint("/api/auth/login")?;
        let endpoint = match endpoint.protocol() {
            Some(_) => endpoint,
            None => endpoint.with_protocol(Protocol::Https),
        }
        .with_method(Method::Post);

        let payload = LoginRequest {
            username: &self.credentials.username,
            password: &self.credentials.password,
        };
        let response = self
            .executor
            .request_with_payload(&endpoint, cancel, &payload)
            .await
            .map_err(|err| ReleaseError::Authentication(err.into()))?;

        let login: Option<LoginResponse> = response
            .deserialize()
            .map_err(|err| ReleaseError::Authentication(err.into()))?;
        let token = login.and_then(|login| login.token).ok_or(ReleaseError::MissingToken)?;

        debug!("authenticated");
        Ok(token)
    }

    /// All versions known to the server.
    pub async fn list_versions(&self, auth_token: &str, cancel: Option<&CancellationToken>) -> Result<Vec<ReleaseVersion>> {
        let endpoint = self
            .options
            .endpoint("/api/version/")?
            .with_header("Authorization", bearer(auth_token));

        let versions: Option<Vec<ReleaseVersion>> = self
            .executor
            .request_as(&endpoint, cancel)
            .await
            .map_err(|err| ReleaseError::ListVersions(err.into()))?;

        Ok(versions.unwrap_or_default())
    }

    /// Create `version` on the channel derived from its name.
    #[instrument(skip(self, auth_token, cancel))]
    pub async fn create_version(
        &self,
        auth_token: &str,
        version: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<ApiResponse> {
        let endpoint = self
            .options
            .endpoint("/api/version/")?
            .with_header("Authorization", bearer(auth_token));

        let payload = NewVersion {
            channel: ChannelRef {
                name: channel_for_version(version),
            },
            name:    version,
            notes:   "",
        };

        self.executor
            .request_with_payload(&endpoint, cancel, &payload)
            .await
            .map_err(|err| ReleaseError::CreateVersion {
                version: version.to_string(),
                source:  err.into(),
            })
    }

    /// Upload `file` as a release asset, streaming it from disk.
    #[instrument(skip(self, auth_token, cancel), fields(file = %file.display()))]
    pub async fn upload_asset(
        &self,
        auth_token: &str,
        file: &Path,
        cancel: Option<&CancellationToken>,
    ) -> Result<ApiResponse> {
        let upload_error = |err: shipwright_http::Error| ReleaseError::Upload {
            file:   file.to_path_buf(),
            source: err.into(),
        };

        let body = RequestBody::file(file).await.map_err(upload_error)?;
        let endpoint = self
            .options
            .endpoint("/api/asset/")?
            .with_method(Method::Post)
            .with_header("Authorization", bearer(auth_token))
            .with_header("Accept", "application/json")
            .with_header("Content-Type", content_type_for(file))
            .with_header("Content-Length", body.len().to_string());

        debug!(bytes = body.len(), "uploading asset");
        self.executor
            .request_with_body(&endpoint, cancel, body)
            .await
            .map_err(upload_error)
    }
}

fn bearer(token: &str) -> String { format!("Bearer {token}") }

/// Content type guessed from the file extension.
pub fn content_type_for(file: &Path) -> String { mime_guess::from_path(file).first_or_octet_stream().to_string() }
