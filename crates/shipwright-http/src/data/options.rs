use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use shipwright_verify::ExpectedDigest;
use tokio_util::sync::CancellationToken;

use super::headers::Headers;
use super::progress::Progress;

/// What happens to a partially written file when a download fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartialFilePolicy {
    /// Leave the partial file where it is.
    #[default]
    Retain,
    /// Delete it, ignoring errors from the removal itself.
    Remove,
}

/// Per-download settings.
///
/// # Examples
///
/// ```
/// use shipwright_http::DownloadOptions;
///
/// let options = DownloadOptions::default()
///     .sha512("2c26b46b68ffc68ff99b453c1d30413413422d706483bfa0f98a5e886266e7ae")
///     .header("Accept", "application/octet-stream")
///     .max_redirects(3);
/// ```
#[derive(Clone)]
pub struct DownloadOptions {
    /// Extra headers, merged over the request's own.
    pub headers: Headers,

    /// Expected sha256, hex encoded.
    pub sha2: Option<String>,

    /// Expected sha512, hex or base64 encoded. Takes priority over `sha2`.
    pub sha512: Option<String>,

    /// Invoked at most once per `progress_interval` while data arrives, and
    /// once more when the body ends. Only used when Content-Length is known.
    pub on_progress: Option<Arc<dyn Fn(&Progress) + Send + Sync>>,

    /// Cancelling this token stops the download; the result is then
    /// [`DownloadOutcome::Cancelled`] rather than an error.
    pub cancellation_token: CancellationToken,

    /// Do not create the destination's parent directory.
    pub skip_dir_creation: bool,

    /// Overrides the executor's download redirect limit.
    pub max_redirects: Option<u32>,

    pub partial_file_policy: PartialFilePolicy,

    pub progress_interval: Duration,
}

impl fmt::Debug for DownloadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadOptions")
            .field("headers", &self.headers)
            .field("sha2", &self.sha2)
            .field("sha512", &self.sha512)
            .field("on_progress", &self.on_progress.as_ref().map(|_| "{ ... }"))
            .field("cancelled", &self.cancellation_token.is_cancelled())
            .field("skip_dir_creation", &self.skip_dir_creation)
            .field("max_redirects", &self.max_redirects)
            .field("partial_file_policy", &self.partial_file_policy)
            .field("progress_interval", &self.progress_interval)
            .finish()
    }
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            headers:             Headers::new(),
            sha2:                None,
            sha512:              None,
            on_progress:         None,
            cancellation_token:  CancellationToken::new(),
            skip_dir_creation:   false,
            max_redirects:       None,
            partial_file_policy: PartialFilePolicy::Retain,
            progress_interval:   Duration::from_secs(1),
        }
    }
}

impl DownloadOptions {
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    #[must_use]
    pub fn sha2(mut self, value: impl Into<String>) -> Self {
        self.sha2 = Some(value.into());
        self
    }

    #[must_use]
    pub fn sha512(mut self, value: impl Into<String>) -> Self {
        self.sha512 = Some(value.into());
        self
    }

    #[must_use]
    pub fn on_progress(mut self, callback: Arc<dyn Fn(&Progress) + Send + Sync>) -> Self {
        self.on_progress = Some(callback);
        self
    }

    #[must_use]
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    #[must_use]
    pub fn skip_dir_creation(mut self, skip: bool) -> Self {
        self.skip_dir_creation = skip;
        self
    }

    #[must_use]
    pub fn max_redirects(mut self, limit: u32) -> Self {
        self.max_redirects = Some(limit);
        self
    }

    #[must_use]
    pub fn partial_file_policy(mut self, policy: PartialFilePolicy) -> Self {
        self.partial_file_policy = policy;
        self
    }

    #[must_use]
    pub fn progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Digest the body must match, preferring sha512 over sha2.
    pub fn content_digest(&self) -> Option<ExpectedDigest> {
        match (&self.sha512, &self.sha2) {
            (Some(sha512), _) => Some(ExpectedDigest::sha512(sha512.clone())),
            (None, Some(sha2)) => Some(ExpectedDigest::sha256_hex(sha2.clone())),
            (None, None) => None,
        }
    }
}

/// How a download ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Completed { path: PathBuf, bytes_written: u64 },
    Cancelled,
}

impl DownloadOutcome {
    pub fn is_cancelled(&self) -> bool { matches!(self, DownloadOutcome::Cancelled) }
}
