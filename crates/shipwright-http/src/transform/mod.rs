//! Stream stages applied to a download body on its way to disk.
//!
//! Each chunk passes through every stage in order before it is written. When
//! the body ends, stages are finished in the same order; the first error from
//! any stage stops the pipeline.

mod digest;
mod pipeline;
mod progress;

use bytes::Bytes;

use crate::error::Result;

pub use digest::DigestTransform;
pub use pipeline::Pipeline;
pub use progress::ProgressTransform;

/// One step of a download pipeline.
pub trait TransformStage: Send {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Process a chunk and hand back what the next stage should see.
    fn transform(&mut self, chunk: Bytes) -> Result<Bytes>;

    /// Called once after the last chunk.
    fn finish(&mut self) -> Result<()> { Ok(()) }
}
