//! Content checksums for source documents.
//!
//! Generated output can embed a checksum of the template it was produced from so that
//! downstream tooling can detect stale output. The checksum bytes are formatted with
//! [`bytes_to_hex`], which is also the canonical byte formatter for the rest of the crate.

use std::fmt::Write;

use md5::Md5;
use sha1::{Digest, Sha1};
use strum::{Display, EnumIter};

/// Convert bytes to a lowercase hex string, two characters per byte and no separators.
///
/// ```rust
/// use tagscope::utils::bytes_to_hex;
///
/// assert_eq!(bytes_to_hex(&[0x0a, 0xff]), "0aff");
/// ```
#[must_use]
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut hex_string = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // Writing into a String cannot fail
        let _ = write!(&mut hex_string, "{:02x}", byte);
    }
    hex_string
}

/// The digest used to fingerprint source content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter)]
pub enum ChecksumAlgorithm {
    /// SHA-1, 20 bytes
    #[default]
    #[strum(serialize = "SHA1")]
    Sha1,
    /// MD5, 16 bytes
    #[strum(serialize = "MD5")]
    Md5,
}

impl ChecksumAlgorithm {
    /// Well-known identifier of the algorithm, as embedded in checksum pragmas.
    #[must_use]
    pub fn guid(self) -> &'static str {
        match self {
            ChecksumAlgorithm::Sha1 => "{ff1816ec-aa5e-4d10-87f7-6f4963833460}",
            ChecksumAlgorithm::Md5 => "{406ea660-64cf-4c82-b6f0-42d48172a799}",
        }
    }

    /// Length of the digest in bytes
    #[must_use]
    pub fn digest_len(self) -> usize {
        match self {
            ChecksumAlgorithm::Sha1 => 20,
            ChecksumAlgorithm::Md5 => 16,
        }
    }

    /// Compute the digest of `data`
    #[must_use]
    pub fn compute(self, data: &[u8]) -> Vec<u8> {
        match self {
            ChecksumAlgorithm::Sha1 => {
                let mut hasher = Sha1::new();
                hasher.update(data);
                hasher.finalize().to_vec()
            }
            ChecksumAlgorithm::Md5 => {
                let mut hasher = Md5::new();
                hasher.update(data);
                hasher.finalize().to_vec()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_bytes_to_hex_helper() {
        let bytes = vec![0x00, 0x01, 0x0a, 0x10, 0xff];
        assert_eq!(bytes_to_hex(&bytes), "00010a10ff");
    }

    #[test]
    fn test_bytes_to_hex_pair() {
        assert_eq!(bytes_to_hex(&[0x0A, 0xFF]), "0aff");
    }

    #[test]
    fn test_bytes_to_hex_empty() {
        assert_eq!(bytes_to_hex(&[]), "");
    }

    #[test]
    fn test_case_sensitivity_in_hex() {
        let hex = bytes_to_hex(&[0xab, 0xcd, 0xef]);
        assert_eq!(hex, "abcdef");
        assert!(!hex.chars().any(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_digest_lengths() {
        for algorithm in ChecksumAlgorithm::iter() {
            let digest = algorithm.compute(b"The quick brown fox jumps over the lazy dog");
            assert_eq!(digest.len(), algorithm.digest_len());
        }
    }

    #[test]
    fn test_known_sha1() {
        let digest =
            ChecksumAlgorithm::Sha1.compute(b"The quick brown fox jumps over the lazy dog");
        assert_eq!(
            bytes_to_hex(&digest),
            "2fd4e1c67a2d28fced849ee1bb76e7391b93eb12"
        );
    }

    #[test]
    fn test_known_md5() {
        let digest = ChecksumAlgorithm::Md5.compute(b"The quick brown fox jumps over the lazy dog");
        assert_eq!(bytes_to_hex(&digest), "9e107d9d372bb6826bd81d3542a419d6");
    }

    #[test]
    fn test_deterministic() {
        let a = ChecksumAlgorithm::Sha1.compute(b"<p>hello</p>");
        let b = ChecksumAlgorithm::Sha1.compute(b"<p>hello</p>");
        assert_eq!(a, b);
    }
}
