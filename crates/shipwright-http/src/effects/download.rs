use std::path::Path;
use std::time::Duration;

use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::executor::HttpExecutor;
use super::http::HttpTransport;
use crate::core::configure_request;
use crate::data::{
    DownloadOptions, DownloadOutcome, PartialFilePolicy, RequestBody, RequestDescriptor, TransportResponse,
};
use crate::error::{Error, Result};
use crate::transform::{DigestTransform, Pipeline, ProgressTransform};

const CHECKSUM_HEADER: &str = "X-Checksum-Sha2";

impl<T: HttpTransport> HttpExecutor<T> {
    /// Stream the response body for `descriptor` into `destination`.
    ///
    /// The body is hashed and counted on its way to disk; the file is synced
    /// before the call returns. If the cancellation token in `options` fires,
    /// any error that follows is swallowed and the outcome is
    /// [`DownloadOutcome::Cancelled`].
    #[instrument(skip_all, fields(url = %descriptor.to_url(), destination = %destination.as_ref().display()))]
    pub async fn download(
        &self,
        descriptor: &RequestDescriptor,
        destination: impl AsRef<Path>,
        options: &DownloadOptions,
    ) -> Result<DownloadOutcome> {
        let destination = destination.as_ref();
        let mut sink_opened = false;

        match self.transfer(descriptor, destination, options, &mut sink_opened).await {
            Ok(bytes_written) => {
                info!(bytes = bytes_written, "download complete");
                Ok(DownloadOutcome::Completed {
                    path: destination.to_path_buf(),
                    bytes_written,
                })
            }
            Err(err) => {
                if sink_opened && options.partial_file_policy == PartialFilePolicy::Remove {
                    debug!(path = %destination.display(), "removing partial file");
                    if let Err(remove_err) = tokio::fs::remove_file(destination).await {
                        warn!(error = %remove_err, "cannot remove partial file");
                    }
                }

                if options.cancellation_token.is_cancelled() {
                    debug!(error = %err, "download cancelled");
                    Ok(DownloadOutcome::Cancelled)
                } else {
                    Err(err)
                }
            }
        }
    }

    async fn transfer(
        &self,
        descriptor: &RequestDescriptor,
        destination: &Path,
        options: &DownloadOptions,
        sink_opened: &mut bool,
    ) -> Result<u64> {
        if !options.skip_dir_creation
            && let Some(parent) = destination.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let token = &options.cancellation_token;
        let idle_timeout = self.config().idle_timeout();
        let limit = options
            .max_redirects
            .unwrap_or(self.config().download_max_redirects);

        let mut current = configure_request(&descriptor.clone().with_headers(&options.headers), None, None, self.config());
        let mut redirects = 0u32;

        let response = loop {
            let response = self.send_once(&current, token, idle_timeout).await?;

            if response.status >= 400 {
                return Err(Error::DownloadStatus {
                    url:     current.to_url(),
                    status:  response.status,
                    message: response.status_message,
                });
            }

            if let Some(location) = response.location() {
                if redirects >= limit {
                    return Err(Error::TooManyRedirects { limit });
                }
                redirects += 1;
                let next = current.redirect_keeping_protocol(location)?;
                debug!(redirects, location = %next.to_url(), "following redirect");
                current = next;
                continue;
            }

            break response;
        };

        check_checksum_header(&response, options)?;

        let mut pipeline = Pipeline::new().idle_timeout(idle_timeout);
        if let Some(callback) = &options.on_progress
            && let Some(total) = response.content_length()
        {
            pipeline = pipeline.stage(ProgressTransform::new(total, options.progress_interval, callback.clone()));
        }
        if let Some(expected) = options.content_digest() {
            pipeline = pipeline.stage(DigestTransform::new(&expected));
        }

        let mut file = File::create(destination).await?;
        *sink_opened = true;

        let written = match pipeline.run(response.body, &mut file, token).await {
            Ok(written) => written,
            Err(err) => {
                // Whatever reached the file stays readable for the caller.
                if let Err(flush_err) = file.flush().await {
                    debug!(error = %flush_err, "cannot flush partial file");
                }
                return Err(err);
            }
        };
        file.sync_all().await?;
        Ok(written)
    }

    async fn send_once(
        &self,
        descriptor: &RequestDescriptor,
        token: &CancellationToken,
        idle_timeout: Duration,
    ) -> Result<TransportResponse> {
        let send = tokio::time::timeout(idle_timeout, self.transport().send(descriptor, RequestBody::Empty));
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(Error::Cancelled),
            result = send => match result {
                Ok(response) => response.map_err(Error::transport),
                Err(_) => Err(Error::Timeout { timeout: idle_timeout }),
            },
        }
    }
}

/// Compare a server-sent sha2 with the expected one before any byte is
/// written.
fn check_checksum_header(response: &TransportResponse, options: &DownloadOptions) -> Result<()> {
    if let Some(expected) = &options.sha2
        && let Some(actual) = response.headers.get(CHECKSUM_HEADER)
        && actual != expected.as_str()
    {
        return Err(Error::ChecksumHeaderMismatch {
            expected: expected.clone(),
            actual:   actual.to_string(),
        });
    }
    Ok(())
}
