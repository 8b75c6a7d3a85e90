use crate::error::{Result, VerifyError};
use crate::{AlgorithmHasher, ExpectedDigest, Hasher};

/// Hashes data as it passes through and checks it against an expected digest.
///
/// Only the hash state is kept, so memory use does not depend on how much
/// data is fed in.
pub struct DigestVerifier {
    hasher:   AlgorithmHasher,
    expected: ExpectedDigest,
    bytes:    u64,
}

impl DigestVerifier {
    pub fn new(expected: ExpectedDigest) -> Self {
        Self {
            hasher: AlgorithmHasher::new(expected.algorithm()),
            expected,
            bytes: 0,
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
        self.bytes += data.len() as u64;
    }

    /// Number of bytes hashed so far.
    pub fn bytes_processed(&self) -> u64 { self.bytes }

    pub fn expected(&self) -> &ExpectedDigest { &self.expected }

    /// Finalize and compare. Returns the computed digest in the expected
    /// encoding on success.
    pub fn finish(self) -> Result<String> {
        let actual = self.expected.encoding().encode(&self.hasher.finalize());
        if actual == self.expected.value() {
            Ok(actual)
        } else {
            Err(VerifyError::Mismatch {
                algorithm: self.expected.algorithm(),
                expected: self.expected.value().to_string(),
                actual,
            })
        }
    }
}
