//! The persisted release manifest.
//!
//! The manifest is rebuilt wholesale on every publish and never patched in
//! place, so serialization must be deterministic: struct fields have a
//! fixed declared order and every mapping is a `BTreeMap`, never a hash
//! map. Optional fields are omitted entirely when absent, not emitted as
//! null.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::artifact::VariantTag;
use crate::digest::{ContentDigest, Md5Digest, Sha256Digest};
use crate::error::CoreError;

/// The manifest schema version this engine reads and writes.
pub const SCHEMA_VERSION: &str = "2.0";

/// The manifest document root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestDocument {
    /// Schema version, pinned at [`SCHEMA_VERSION`].
    pub schema_version: String,
    /// When this document was built (ISO-8601 UTC).
    pub last_update: String,
    /// The primary application artifact.
    pub app: AppDescriptor,
    /// Auxiliary resources, in declared order.
    pub resources: Vec<ResourceDescriptor>,
}

/// The primary application section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDescriptor {
    /// Application version string.
    pub version: String,
    /// Release date of this application version (`YYYY-MM-DD`).
    pub release_date: String,
    /// Changelog lines for this publish.
    pub changelog: Vec<String>,
    /// Whether installers must take this update.
    pub required: bool,
    /// One file per present variant. Absent variants are omitted.
    pub files: BTreeMap<VariantTag, FileDescriptor>,
}

/// Checksums of a file's payload.
///
/// For a compressed resource both hashes cover the decompressed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checksum {
    /// Strong hash.
    pub sha256: Sha256Digest,
    /// Legacy weak hash.
    pub md5: Md5Digest,
}

impl From<&ContentDigest> for Checksum {
    fn from(digest: &ContentDigest) -> Self {
        Self {
            sha256: digest.sha256,
            md5: digest.md5,
        }
    }
}

/// One downloadable file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    /// Download URL per channel name (e.g. `github`, `mirror`).
    pub urls: BTreeMap<String, String>,
    /// Download size in bytes. For a compressed resource this is the
    /// compressed size; it is never the decompressed size.
    pub size: u64,
    /// Payload checksums.
    pub checksum: Checksum,
    /// Whether the download is compressed.
    #[serde(default)]
    pub compressed: bool,
    /// Compression algorithm, when compressed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_type: Option<String>,
    /// Decompressed payload size, when compressed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncompressed_size: Option<u64>,
    /// Install-local filename for resource files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
    /// Minimum free disk space an installer should require.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_disk_space_bytes: Option<u64>,
}

/// One auxiliary resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    /// Stable resource name, the key change detection matches on.
    pub name: String,
    /// Human-readable name.
    pub display_name: String,
    /// Resolved version token.
    pub version: String,
    /// Whether installers must fetch this resource.
    pub required: bool,
    /// Human-readable description.
    pub description: String,
    /// The resource's file.
    pub files: FileDescriptor,
}

impl ManifestDocument {
    /// Serialize to the published wire form: 2-space pretty JSON with a
    /// trailing newline. Byte-identical for equal documents.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, CoreError> {
        let mut bytes =
            serde_json::to_vec_pretty(self).map_err(|e| CoreError::Encode(e.to_string()))?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Parse a previously published document, checking the schema version.
    pub fn from_json_str(s: &str) -> Result<Self, CoreError> {
        let doc: ManifestDocument =
            serde_json::from_str(s).map_err(|e| CoreError::Parse(e.to_string()))?;
        if doc.schema_version != SCHEMA_VERSION {
            return Err(CoreError::UnsupportedSchema(doc.schema_version));
        }
        Ok(doc)
    }

    /// Look up a resource by name.
    pub fn resource(&self, name: &str) -> Option<&ResourceDescriptor> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// Look up a variant's file descriptor.
    pub fn variant_file(&self, tag: VariantTag) -> Option<&FileDescriptor> {
        self.app.files.get(&tag)
    }
}
