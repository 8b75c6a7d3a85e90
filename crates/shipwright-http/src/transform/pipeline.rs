use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::TransformStage;
use crate::data::BodyStream;
use crate::error::{Error, Result};

/// Ordered stages between a response body and a sink.
#[derive(Default)]
pub struct Pipeline {
    stages:       Vec<Box<dyn TransformStage>>,
    idle_timeout: Option<Duration>,
}

impl Pipeline {
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn stage(mut self, stage: impl TransformStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Fail with [`Error::Timeout`] when no chunk arrives for `timeout`.
    #[must_use]
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> { self.stages.iter().map(|stage| stage.name()).collect() }

    /// Drive `source` through every stage into `sink` and return the number of
    /// bytes written. The sink is flushed after the stages finish.
    pub async fn run<W>(mut self, mut source: BodyStream, sink: &mut W, token: &CancellationToken) -> Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        debug!(stages = ?self.stage_names(), "running download pipeline");

        let mut written = 0u64;
        loop {
            let next = tokio::select! {
                biased;
                _ = token.cancelled() => return Err(Error::Cancelled),
                next = next_chunk(&mut source, self.idle_timeout) => next?,
            };
            let Some(mut chunk) = next else { break };

            for stage in &mut self.stages {
                chunk = stage.transform(chunk)?;
            }
            sink.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        for stage in &mut self.stages {
            stage.finish()?;
        }
        sink.flush().await?;
        Ok(written)
    }
}

async fn next_chunk(source: &mut BodyStream, idle_timeout: Option<Duration>) -> Result<Option<Bytes>> {
    let next = match idle_timeout {
        Some(timeout) => tokio::time::timeout(timeout, source.next())
            .await
            .map_err(|_| Error::Timeout { timeout })?,
        None => source.next().await,
    };
    Ok(next.transpose()?)
}
