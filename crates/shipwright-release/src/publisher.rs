use std::fmt;
use std::path::Path;
use std::sync::Arc;

use shipwright_http::{ApiResponse, CancellationToken, HttpExecutor, HttpTransport, Lazy};
use tracing::{info, instrument};

use crate::client::ReleaseServerClient;
use crate::error::{ReleaseError, Result};
use crate::options::{Credentials, ReleaseServerOptions};

/// Publishes artifacts of one version to a release server.
///
/// Logs in on first use and reuses the session token for every later upload.
pub struct ReleaseServerPublisher<T> {
    client:     Arc<ReleaseServerClient<T>>,
    version:    String,
    auth_token: Lazy<String, ReleaseError>,
    cancel:     CancellationToken,
}

impl<T> ReleaseServerPublisher<T>
where
    T: HttpTransport + 'static,
{
    /// Fails straight away when username or password cannot be resolved from
    /// the options or the environment.
    pub fn new(
        executor: Arc<HttpExecutor<T>>,
        options: ReleaseServerOptions,
        version: impl Into<String>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let credentials = options.credentials()?;
        Ok(Self::with_credentials(executor, options, credentials, version, cancel))
    }

    /// Like [`ReleaseServerPublisher::new`], with `lookup` in place of the
    /// process environment for unset credentials.
    pub fn with_credential_lookup(
        executor: Arc<HttpExecutor<T>>,
        options: ReleaseServerOptions,
        version: impl Into<String>,
        cancel: CancellationToken,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let credentials = options.credentials_with(lookup)?;
        Ok(Self::with_credentials(executor, options, credentials, version, cancel))
    }

    fn with_credentials(
        executor: Arc<HttpExecutor<T>>,
        options: ReleaseServerOptions,
        credentials: Credentials,
        version: impl Into<String>,
        cancel: CancellationToken,
    ) -> Self {
        let client = Arc::new(ReleaseServerClient::new(executor, options, credentials));

        let login = client.clone();
        let login_cancel = cancel.clone();
        let auth_token = Lazy::new(move || async move { login.authenticate(Some(&login_cancel)).await });

        Self {
            client,
            version: version.into(),
            auth_token,
            cancel,
        }
    }

    pub fn version(&self) -> &str { &self.version }

    pub fn client(&self) -> &ReleaseServerClient<T> { &self.client }

    /// Make sure the version exists, then upload `file` to it.
    #[instrument(skip(self), fields(version = %self.version, file = %file.display()))]
    pub async fn publish(&self, file: &Path) -> Result<ApiResponse> {
        let token = self.auth_token.value().await.map_err(Arc::unwrap_or_clone)?;
        let cancel = Some(&self.cancel);

        let versions = self.client.list_versions(&token, cancel).await?;
        if !versions.iter().any(|version| version.name == self.version) {
            info!("creating release version");
            self.client.create_version(&token, &self.version, cancel).await?;
        }

        let response = self.client.upload_asset(&token, file, cancel).await?;
        info!("asset uploaded");
        Ok(response)
    }
}

impl<T> fmt::Debug for ReleaseServerPublisher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseServerPublisher")
            .field("client", &self.client)
            .field("version", &self.version)
            .field("logged_in", &self.auth_token.peek().is_some_and(|token| token.is_ok()))
            .finish()
    }
}
