use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Textual encoding of a digest value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestEncoding {
    /// Lower-case hexadecimal.
    Hex,
    /// Standard alphabet base64 with padding.
    Base64,
}

impl DigestEncoding {
    /// Guess the encoding of a sha512 checksum.
    ///
    /// A sha512 digest is 128 characters in hex; anything else (including
    /// values carrying `+`, `/` or `=` padding) is treated as base64.
    pub fn infer_sha512(value: &str) -> Self {
        if value.len() == 128 && value.bytes().all(|b| b.is_ascii_hexdigit()) {
            Self::Hex
        } else {
            Self::Base64
        }
    }

    pub fn encode(&self, digest: &[u8]) -> String {
        match self {
            Self::Hex => hex::encode(digest),
            Self::Base64 => STANDARD.encode(digest),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hex => "hex",
            Self::Base64 => "base64",
        }
    }
}

impl std::fmt::Display for DigestEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}
