//! Content digests: a strong SHA-256 hash plus a legacy MD5 hash.
//!
//! Both hashes are published in the manifest so old installers that only
//! verify MD5 keep working. They are always computed together, in one pass
//! over the file (see `relpub-engine::digest`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// A 32-byte SHA-256 digest, serialized as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Digest(pub [u8; 32]);

impl Sha256Digest {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for Sha256Digest {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 64 {
            return Err(CoreError::InvalidDigestLength {
                algorithm: "sha256",
                expected: 64,
                got: s.len(),
            });
        }
        let bytes = hex::decode(s).map_err(|e| CoreError::InvalidDigestHex(e.to_string()))?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256Digest({})", self.to_hex())
    }
}

impl Serialize for Sha256Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Sha256Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A 16-byte MD5 digest, serialized as lowercase hex.
///
/// MD5 is kept for compatibility with deployed installers only; it carries
/// no integrity weight on its own.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Md5Digest(pub [u8; 16]);

impl Md5Digest {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Convert to lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for Md5Digest {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(CoreError::InvalidDigestLength {
                algorithm: "md5",
                expected: 32,
                got: s.len(),
            });
        }
        let bytes = hex::decode(s).map_err(|e| CoreError::InvalidDigestHex(e.to_string()))?;
        let mut arr = [0u8; 16];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Display for Md5Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Md5Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Md5Digest({})", self.to_hex())
    }
}

impl Serialize for Md5Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Md5Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The full digest of one file: byte size plus both hashes.
///
/// Computed once per file per run and never mutated. For a compressed
/// bundle this describes the *decompressed* payload; the compressed
/// download size is tracked separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDigest {
    /// File size in bytes.
    pub size_bytes: u64,
    /// Strong hash.
    pub sha256: Sha256Digest,
    /// Legacy weak hash.
    pub md5: Md5Digest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_roundtrip() {
        let digest = Sha256Digest::from_bytes([0xab; 32]);
        let hex = digest.to_hex();
        assert_eq!(hex.len(), 64);
        let parsed: Sha256Digest = hex.parse().unwrap();
        assert_eq!(digest, parsed);
    }

    #[test]
    fn test_md5_hex_roundtrip() {
        let digest = Md5Digest::from_bytes([0x5e; 16]);
        let parsed: Md5Digest = digest.to_hex().parse().unwrap();
        assert_eq!(digest, parsed);
    }

    #[test]
    fn test_reject_wrong_length() {
        assert!(matches!(
            "abcd".parse::<Sha256Digest>(),
            Err(CoreError::InvalidDigestLength { got: 4, .. })
        ));
        assert!(matches!(
            "abcd".parse::<Md5Digest>(),
            Err(CoreError::InvalidDigestLength { got: 4, .. })
        ));
    }

    #[test]
    fn test_reject_non_hex() {
        let bad = "zz".repeat(32);
        assert!(matches!(
            bad.parse::<Sha256Digest>(),
            Err(CoreError::InvalidDigestHex(_))
        ));
    }

    #[test]
    fn test_serde_as_hex_string() {
        let digest = ContentDigest {
            size_bytes: 42,
            sha256: Sha256Digest::from_bytes([0x01; 32]),
            md5: Md5Digest::from_bytes([0x02; 16]),
        };
        let json = serde_json::to_string(&digest).unwrap();
        assert!(json.contains(&"01".repeat(32)));
        assert!(json.contains(&"02".repeat(16)));
        let back: ContentDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(digest, back);
    }
}
