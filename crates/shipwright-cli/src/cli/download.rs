use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Args;
use shipwright_http::{
    CancellationToken, DownloadOptions, DownloadOutcome, HttpExecutor, HttpTransport, PartialFilePolicy, Progress,
    RequestDescriptor,
};
use tracing::info;

use crate::ui::ProgressTracker;

#[derive(Clone, Debug, Args)]
pub struct DownloadArg {
    /// URL to download.
    pub url: String,

    /// Where to write the file.
    pub dest: PathBuf,

    /// Expected sha256, hex encoded.
    #[arg(long)]
    pub sha2: Option<String>,

    /// Expected sha512, hex or base64 encoded.
    #[arg(long)]
    pub sha512: Option<String>,

    /// Extra request header, as `Name: value`.
    #[arg(short = 'H', long, value_parser = parse_header)]
    pub header: Vec<(String, String)>,

    /// Redirect limit for this download.
    #[arg(long)]
    pub max_redirects: Option<u32>,

    /// Delete the partial file when the download fails.
    #[arg(long)]
    pub remove_partial: bool,
}

impl DownloadArg {
    pub async fn run<T: HttpTransport>(self, executor: &HttpExecutor<T>, cancel: CancellationToken) -> anyhow::Result<()> {
        let descriptor = RequestDescriptor::parse(&self.url).with_context(|| format!("invalid URL {}", self.url))?;

        let tracker = ProgressTracker::new("Downloading");
        let reporter = tracker.clone();

        let mut options = DownloadOptions::default()
            .cancellation_token(cancel)
            .on_progress(Arc::new(move |progress: &Progress| reporter.update(progress)));
        for (name, value) in self.header {
            options = options.header(name, value);
        }
        if let Some(sha2) = self.sha2 {
            options = options.sha2(sha2);
        }
        if let Some(sha512) = self.sha512 {
            options = options.sha512(sha512);
        }
        if let Some(limit) = self.max_redirects {
            options = options.max_redirects(limit);
        }
        if self.remove_partial {
            options = options.partial_file_policy(PartialFilePolicy::Remove);
        }

        let outcome = executor.download(&descriptor, &self.dest, &options).await;
        match outcome {
            Ok(DownloadOutcome::Completed { path, bytes_written }) => {
                tracker.finish("done");
                info!(path = %path.display(), bytes = bytes_written, "saved");
                Ok(())
            }
            Ok(DownloadOutcome::Cancelled) => {
                tracker.abandon();
                bail!("download of {} cancelled", self.url)
            }
            Err(err) => {
                tracker.abandon();
                Err(err).with_context(|| format!("cannot download {}", self.url))
            }
        }
    }
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in `{raw}`"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("X-Token:  abc ").unwrap(),
            ("X-Token".to_string(), "abc".to_string())
        );
        assert_eq!(
            parse_header("Accept: a:b").unwrap(),
            ("Accept".to_string(), "a:b".to_string())
        );
        assert!(parse_header("no-colon").is_err());
        assert!(parse_header(": value").is_err());
    }
}
