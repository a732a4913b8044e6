//! Streaming content digests.
//!
//! Candidate files may be multi-gigabyte, so both hashes are fed from one
//! bounded-memory pass over fixed-size chunks. The file is never read
//! twice and never buffered whole.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use md5::Md5;
use sha2::{Digest, Sha256};

use relpub_core::{ContentDigest, Md5Digest, Sha256Digest};

use crate::error::{EngineError, Result};

/// Read chunk size for streaming digests.
const CHUNK_SIZE: usize = 64 * 1024;

/// Seam for content digest computation, so resolution logic can be tested
/// without real files.
pub trait DigestService {
    /// Digest the file at `path`.
    fn digest(&self, path: &Path) -> Result<ContentDigest>;
}

/// The production digest service: chunked, single-pass SHA-256 + MD5.
#[derive(Debug, Default)]
pub struct StreamingDigester;

impl StreamingDigester {
    /// Create a new digester.
    pub fn new() -> Self {
        Self
    }
}

impl DigestService for StreamingDigester {
    fn digest(&self, path: &Path) -> Result<ContentDigest> {
        let mut file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EngineError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                EngineError::Io(e)
            }
        })?;

        let mut sha256 = Sha256::new();
        let mut md5 = Md5::new();
        let mut size_bytes = 0u64;
        let mut buf = vec![0u8; CHUNK_SIZE];

        loop {
            let n = file.read(&mut buf)?;
            if n == 0 {
                break;
            }
            sha256.update(&buf[..n]);
            md5.update(&buf[..n]);
            size_bytes += n as u64;
        }

        Ok(ContentDigest {
            size_bytes,
            sha256: Sha256Digest::from_bytes(sha256.finalize().into()),
            md5: Md5Digest::from_bytes(md5.finalize().into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.bin");
        File::create(&path).unwrap().write_all(contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_known_vectors() {
        let (_dir, path) = write_temp(b"hello world");
        let digest = StreamingDigester::new().digest(&path).unwrap();
        assert_eq!(digest.size_bytes, 11);
        assert_eq!(
            digest.sha256.to_hex(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
        assert_eq!(digest.md5.to_hex(), "5eb63bbbe01eeed093cb22bb8f5acdc3");
    }

    #[test]
    fn test_empty_file() {
        let (_dir, path) = write_temp(b"");
        let digest = StreamingDigester::new().digest(&path).unwrap();
        assert_eq!(digest.size_bytes, 0);
        assert_eq!(
            digest.sha256.to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(digest.md5.to_hex(), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_chunked_matches_whole_buffer() {
        // Larger than one chunk, so the streaming path is exercised.
        let data: Vec<u8> = (0..(3 * CHUNK_SIZE + 17)).map(|i| (i % 251) as u8).collect();
        let (_dir, path) = write_temp(&data);

        let digest = StreamingDigester::new().digest(&path).unwrap();
        assert_eq!(digest.size_bytes, data.len() as u64);

        let expected_sha: [u8; 32] = Sha256::digest(&data).into();
        let expected_md5: [u8; 16] = Md5::digest(&data).into();
        assert_eq!(digest.sha256, Sha256Digest::from_bytes(expected_sha));
        assert_eq!(digest.md5, Md5Digest::from_bytes(expected_md5));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = StreamingDigester::new()
            .digest(&dir.path().join("absent.bin"))
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }
}
