/// Snapshot of a running download, passed to progress callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Total expected bytes, from the Content-Length header.
    pub total:            u64,
    /// Bytes received so far.
    pub transferred:      u64,
    /// Bytes received since the previous report.
    pub delta:            u64,
    pub bytes_per_second: u64,
}

impl Progress {
    /// Completion percentage in `0.0..=100.0`.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.transferred as f64 / self.total as f64 * 100.0).min(100.0)
    }

    pub fn is_complete(&self) -> bool { self.transferred >= self.total }
}
