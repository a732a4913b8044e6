//! Temporary on-disk workspaces and digest helpers.

use std::io::Write;
use std::path::PathBuf;

use flate2::write::GzEncoder;
use flate2::Compression;
use md5::Md5;
use sha2::{Digest, Sha256};
use tempfile::TempDir;

use relpub_core::{ContentDigest, ManifestDocument, Md5Digest, Sha256Digest};

/// A temporary directory tree shaped like a real publish workspace:
/// a build-output directory, a data directory, a feed-segment directory,
/// and a manifest path at the root.
pub struct TempWorkspace {
    /// Keeps the tree alive for the test's duration.
    pub root: TempDir,
    /// Where built application artifacts land.
    pub artifact_dir: PathBuf,
    /// Where resource data files live.
    pub data_dir: PathBuf,
    /// Where downloaded feed segments land.
    pub segment_dir: PathBuf,
    /// The published manifest location.
    pub manifest_path: PathBuf,
}

impl TempWorkspace {
    /// Create the directory tree.
    pub fn new() -> Self {
        let root = TempDir::new().expect("create temp workspace");
        let artifact_dir = root.path().join("out");
        let data_dir = root.path().join("data");
        let segment_dir = root.path().join("segments");
        for dir in [&artifact_dir, &data_dir, &segment_dir] {
            std::fs::create_dir_all(dir).expect("create workspace dir");
        }
        let manifest_path = root.path().join("manifest.json");
        Self {
            root,
            artifact_dir,
            data_dir,
            segment_dir,
            manifest_path,
        }
    }

    /// Write an application artifact into the build-output directory.
    pub fn write_artifact(&self, name: &str, contents: &[u8]) -> PathBuf {
        write_file(&self.artifact_dir.join(name), contents)
    }

    /// Write a resource file into the data directory.
    pub fn write_data(&self, name: &str, contents: &[u8]) -> PathBuf {
        write_file(&self.data_dir.join(name), contents)
    }

    /// Write a compressed bundle plus its decompressed counterpart into the
    /// data directory. Returns `(compressed_path, counterpart_path)`.
    pub fn write_bundle(&self, compressed_name: &str, payload: &[u8]) -> (PathBuf, PathBuf) {
        let compressed = self.write_data(compressed_name, &gzip_bytes(payload));
        let counterpart_name = compressed_name
            .strip_suffix(".gzip")
            .unwrap_or(compressed_name);
        let counterpart = self.write_data(counterpart_name, payload);
        (compressed, counterpart)
    }

    /// Write a feed segment file.
    pub fn write_segment(&self, name: &str, contents: &[u8]) -> PathBuf {
        write_file(&self.segment_dir.join(name), contents)
    }

    /// Persist a manifest document at the workspace manifest path.
    pub fn write_manifest(&self, document: &ManifestDocument) {
        let bytes = document.to_json_bytes().expect("encode manifest");
        std::fs::write(&self.manifest_path, bytes).expect("write manifest");
    }

    /// Write arbitrary bytes at the manifest path (for corrupt-manifest
    /// tests).
    pub fn write_manifest_raw(&self, contents: &str) {
        std::fs::write(&self.manifest_path, contents).expect("write manifest");
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

fn write_file(path: &std::path::Path, contents: &[u8]) -> PathBuf {
    std::fs::write(path, contents).expect("write fixture file");
    path.to_path_buf()
}

/// Gzip-compress a byte slice.
pub fn gzip_bytes(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("gzip write");
    encoder.finish().expect("gzip finish")
}

/// Compute the in-memory digest of a byte slice, for building expected
/// values in assertions.
pub fn digest_of(data: &[u8]) -> ContentDigest {
    let sha: [u8; 32] = Sha256::digest(data).into();
    let md5: [u8; 16] = Md5::digest(data).into();
    ContentDigest {
        size_bytes: data.len() as u64,
        sha256: Sha256Digest::from_bytes(sha),
        md5: Md5Digest::from_bytes(md5),
    }
}
