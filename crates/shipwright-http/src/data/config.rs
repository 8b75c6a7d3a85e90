use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;

/// Executor-wide settings.
///
/// Can be loaded from TOML; missing keys take their defaults.
///
/// ```toml
/// user-agent = "my-tool/1.0"
/// max-redirects = 5
/// idle-timeout-secs = 30
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExecutorConfig {
    /// Sent when a request carries no User-Agent of its own.
    pub user_agent:              String,
    /// Redirect limit for API requests.
    pub max_redirects:           u32,
    /// Redirect limit for downloads, unless overridden per download.
    pub download_max_redirects:  u32,
    /// Seconds without data before a download is aborted.
    pub idle_timeout_secs:       u64,
    /// Force `https` on descriptors that leave the protocol unset.
    pub require_secure_protocol: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            user_agent:              default_user_agent(),
            max_redirects:           10,
            download_max_redirects:  10,
            idle_timeout_secs:       60,
            require_secure_protocol: false,
        }
    }
}

impl ExecutorConfig {
    pub fn idle_timeout(&self) -> Duration { Duration::from_secs(self.idle_timeout_secs) }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn with_max_redirects(mut self, max_redirects: u32) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    #[must_use]
    pub fn with_download_max_redirects(mut self, max_redirects: u32) -> Self {
        self.download_max_redirects = max_redirects;
        self
    }

    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout_secs = timeout.as_secs();
        self
    }

    #[must_use]
    pub fn with_require_secure_protocol(mut self, require: bool) -> Self {
        self.require_secure_protocol = require;
        self
    }

    pub fn from_toml_str(source: &str) -> Result<Self> { Ok(toml::from_str(source)?) }

    pub async fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = tokio::fs::read_to_string(path).await?;
        Self::from_toml_str(&source)
    }
}

fn default_user_agent() -> String { format!("shipwright/{}", env!("CARGO_PKG_VERSION")) }
