use bytes::Bytes;
use shipwright_verify::{DigestVerifier, ExpectedDigest};
use tracing::debug;

use super::TransformStage;
use crate::error::Result;

/// Pass-through stage that hashes every chunk and checks the digest at the
/// end of the body.
pub struct DigestTransform {
    verifier: Option<DigestVerifier>,
}

impl DigestTransform {
    pub fn new(expected: &ExpectedDigest) -> Self {
        Self {
            verifier: Some(expected.verifier()),
        }
    }
}

impl TransformStage for DigestTransform {
    fn name(&self) -> &'static str { "digest" }

    fn transform(&mut self, chunk: Bytes) -> Result<Bytes> {
        if let Some(verifier) = self.verifier.as_mut() {
            verifier.update(&chunk);
        }
        Ok(chunk)
    }

    fn finish(&mut self) -> Result<()> {
        let Some(verifier) = self.verifier.take() else {
            return Ok(());
        };
        let algorithm = verifier.expected().algorithm();
        let bytes = verifier.bytes_processed();
        let digest = verifier.finish()?;
        debug!(%algorithm, bytes, digest, "checksum verified");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use shipwright_verify::VerifyError;

    const HELLO_WORLD_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn test_passes_chunks_through() {
        let mut stage = DigestTransform::new(&ExpectedDigest::sha256_hex(HELLO_WORLD_SHA256));

        let out = stage.transform(Bytes::from_static(b"hello ")).unwrap();
        assert_eq!(&out[..], b"hello ");
        stage.transform(Bytes::from_static(b"world")).unwrap();

        stage.finish().unwrap();
    }

    #[test]
    fn test_mismatch_on_finish() {
        let mut stage = DigestTransform::new(&ExpectedDigest::sha256_hex(HELLO_WORLD_SHA256));
        stage.transform(Bytes::from_static(b"hello World")).unwrap();

        assert!(matches!(
            stage.finish(),
            Err(Error::Digest(VerifyError::Mismatch { expected, .. })) if expected == HELLO_WORLD_SHA256
        ));
    }

    #[test]
    fn test_finish_twice_is_noop() {
        let mut stage = DigestTransform::new(&ExpectedDigest::sha256_hex(HELLO_WORLD_SHA256));
        stage.transform(Bytes::from_static(b"hello world")).unwrap();
        stage.finish().unwrap();
        stage.finish().unwrap();
    }
}
