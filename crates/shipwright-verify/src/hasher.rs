use sha2::Digest;

use crate::DigestAlgorithm;

/// Incremental hash state fed chunk by chunk.
pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);
    fn finalize(self) -> Vec<u8>;
}

/// Adapter over any RustCrypto [`Digest`].
pub struct DigestHasher<D: Digest + Send>(D);

impl<D: Digest + Send> Hasher for DigestHasher<D> {
    fn update(&mut self, data: &[u8]) { Digest::update(&mut self.0, data); }

    fn finalize(self) -> Vec<u8> { self.0.finalize().to_vec() }
}

impl<D: Digest + Send> Default for DigestHasher<D> {
    fn default() -> Self { Self::new() }
}

impl<D: Digest + Send> DigestHasher<D> {
    pub fn new() -> Self { Self(D::new()) }

    pub fn digest(data: &[u8]) -> Vec<u8> { D::digest(data).to_vec() }
}

pub type Sha256Hasher = DigestHasher<sha2::Sha256>;

pub type Sha512Hasher = DigestHasher<sha2::Sha512>;

/// Hasher selected at runtime from a [`DigestAlgorithm`].
pub enum AlgorithmHasher {
    Sha256(Sha256Hasher),
    Sha512(Sha512Hasher),
}

impl AlgorithmHasher {
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Sha256 => Self::Sha256(Sha256Hasher::new()),
            DigestAlgorithm::Sha512 => Self::Sha512(Sha512Hasher::new()),
        }
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        match self {
            Self::Sha256(_) => DigestAlgorithm::Sha256,
            Self::Sha512(_) => DigestAlgorithm::Sha512,
        }
    }
}

impl Hasher for AlgorithmHasher {
    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Self::Sha256(h) => h.finalize(),
            Self::Sha512(h) => h.finalize(),
        }
    }
}
