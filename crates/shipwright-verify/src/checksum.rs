//! Expected digests and the algorithms that produce them.

use crate::{DigestEncoding, DigestVerifier};

/// Supported hash algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Sha512 => "sha512",
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

/// A digest value the content is expected to hash to.
///
/// The value is kept exactly as given; comparison is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedDigest {
    algorithm: DigestAlgorithm,
    encoding:  DigestEncoding,
    value:     String,
}

impl ExpectedDigest {
    pub fn new(algorithm: DigestAlgorithm, encoding: DigestEncoding, value: impl Into<String>) -> Self {
        Self {
            algorithm,
            encoding,
            value: value.into(),
        }
    }

    /// sha256 in hex, the form "sha2" checksums are published in.
    pub fn sha256_hex(value: impl Into<String>) -> Self {
        Self::new(DigestAlgorithm::Sha256, DigestEncoding::Hex, value)
    }

    /// sha512 with the encoding inferred from the value.
    pub fn sha512(value: impl Into<String>) -> Self {
        let value = value.into();
        let encoding = DigestEncoding::infer_sha512(&value);
        Self::new(DigestAlgorithm::Sha512, encoding, value)
    }

    pub fn algorithm(&self) -> DigestAlgorithm { self.algorithm }

    pub fn encoding(&self) -> DigestEncoding { self.encoding }

    pub fn value(&self) -> &str { &self.value }

    /// Start a streaming verification against this digest.
    pub fn verifier(&self) -> DigestVerifier { DigestVerifier::new(self.clone()) }
}
