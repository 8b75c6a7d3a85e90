use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use shipwright_http::{CancellationToken, HttpExecutor, HttpTransport};
use shipwright_release::{PASSWORD_ENV, ReleaseServerOptions, ReleaseServerPublisher, USERNAME_ENV};
use tracing::info;

#[derive(Clone, Debug, Args)]
pub struct PublishArg {
    /// Artifacts to upload.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Release server host or URL.
    #[arg(long, env = "RELEASE_SERVER_URL")]
    pub server: String,

    /// Version the artifacts belong to; created when missing.
    #[arg(long)]
    pub release: String,

    #[arg(long, env = USERNAME_ENV)]
    pub username: Option<String>,

    #[arg(long, env = PASSWORD_ENV, hide_env_values = true)]
    pub password: Option<String>,
}

impl PublishArg {
    pub async fn run<T: HttpTransport + 'static>(
        self,
        executor: Arc<HttpExecutor<T>>,
        cancel: CancellationToken,
    ) -> anyhow::Result<()> {
        let mut options = ReleaseServerOptions::new(self.server);
        options.username = self.username;
        options.password = self.password;

        let publisher = ReleaseServerPublisher::new(executor, options, self.release, cancel)?;

        for file in &self.files {
            publisher
                .publish(file)
                .await
                .with_context(|| format!("cannot publish {}", file.display()))?;
            info!(file = %file.display(), version = publisher.version(), "published");
        }
        Ok(())
    }
}
