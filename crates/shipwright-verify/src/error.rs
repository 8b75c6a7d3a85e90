use crate::DigestAlgorithm;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("{algorithm} checksum mismatch, expected {expected}, got {actual}")]
    Mismatch {
        algorithm: DigestAlgorithm,
        expected:  String,
        actual:    String,
    },
}

pub type Result<T> = std::result::Result<T, VerifyError>;
