use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;

use super::TransformStage;
use crate::data::Progress;
use crate::error::Result;

/// Counts bytes against a known total and reports through a callback, at most
/// once per interval while data flows and once more at the end.
pub struct ProgressTransform {
    total:         u64,
    transferred:   u64,
    last_reported: u64,
    started:       Instant,
    next_update:   Instant,
    interval:      Duration,
    callback:      Arc<dyn Fn(&Progress) + Send + Sync>,
}

impl ProgressTransform {
    pub fn new(total: u64, interval: Duration, callback: Arc<dyn Fn(&Progress) + Send + Sync>) -> Self {
        let now = Instant::now();
        Self {
            total,
            transferred: 0,
            last_reported: 0,
            started: now,
            next_update: now + interval,
            interval,
            callback,
        }
    }

    fn report(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.started).as_secs_f64();
        let bytes_per_second = if elapsed > 0.0 {
            (self.transferred as f64 / elapsed) as u64
        } else {
            0
        };

        let progress = Progress {
            total: self.total,
            transferred: self.transferred,
            delta: self.transferred - self.last_reported,
            bytes_per_second,
        };
        self.last_reported = self.transferred;
        self.next_update = now + self.interval;
        (self.callback)(&progress);
    }
}

impl TransformStage for ProgressTransform {
    fn name(&self) -> &'static str { "progress" }

    fn transform(&mut self, chunk: Bytes) -> Result<Bytes> {
        self.transferred += chunk.len() as u64;
        let now = Instant::now();
        if now >= self.next_update {
            self.report(now);
        }
        Ok(chunk)
    }

    fn finish(&mut self) -> Result<()> {
        self.report(Instant::now());
        Ok(())
    }
}
