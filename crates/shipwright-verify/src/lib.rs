//! Content verification primitives for downloaded artifacts.
//!
//! Digests are computed incrementally while data streams through, so an
//! artifact is verified in the same pass that writes it to disk.
//!
//! # Example
//!
//! ```
//! use shipwright_verify::ExpectedDigest;
//!
//! let expected = ExpectedDigest::sha256_hex(
//!     "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9",
//! );
//!
//! let mut verifier = expected.verifier();
//! verifier.update(b"hello ");
//! verifier.update(b"world");
//! verifier.finish().unwrap();
//! ```

pub use self::checksum::{DigestAlgorithm, ExpectedDigest};
pub use self::encoding::DigestEncoding;
pub use self::error::{Result, VerifyError};
pub use self::hasher::{AlgorithmHasher, DigestHasher, Hasher, Sha256Hasher, Sha512Hasher};
pub use self::verifier::DigestVerifier;

mod checksum;
mod encoding;
mod error;
mod hasher;
mod verifier;
