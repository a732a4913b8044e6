//! Candidate artifacts: what the sources observed on disk this run.
//!
//! The engine never discovers files itself. Sources hand it artifacts
//! already tagged with their kind, so resolution policy dispatches on an
//! explicit tag instead of re-deriving it from filename patterns.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::version::DateToken;

/// One of the two mutually-exclusive runtime-compatibility builds of the
/// primary application artifact.
///
/// `Ord` follows declaration order (legacy first) so every per-variant
/// iteration in the pipeline is stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariantTag {
    /// Build targeting the legacy runtime baseline.
    LegacyRuntime,
    /// Build targeting the current runtime.
    CurrentRuntime,
}

impl VariantTag {
    /// All variants, in stable order.
    pub const ALL: [VariantTag; 2] = [VariantTag::LegacyRuntime, VariantTag::CurrentRuntime];

    /// The manifest key for this variant.
    pub fn as_str(self) -> &'static str {
        match self {
            VariantTag::LegacyRuntime => "legacy-runtime",
            VariantTag::CurrentRuntime => "current-runtime",
        }
    }

    /// Parse a manifest key.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "legacy-runtime" => Ok(VariantTag::LegacyRuntime),
            "current-runtime" => Ok(VariantTag::CurrentRuntime),
            other => Err(CoreError::UnknownVariantTag(other.to_string())),
        }
    }

    /// The other variant.
    pub fn other(self) -> Self {
        match self {
            VariantTag::LegacyRuntime => VariantTag::CurrentRuntime,
            VariantTag::CurrentRuntime => VariantTag::LegacyRuntime,
        }
    }
}

impl std::fmt::Display for VariantTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of a candidate artifact, determining its resolution policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// A primary application build, versioned by an external semantic string.
    PrimaryVariant,
    /// A large resource shipped compressed, versioned by embedded date token
    /// or by decompressed-content hash.
    CompressedBundle,
    /// A resource whose authoritative version is an upstream date token.
    DatedFeed,
}

/// A primary application build observed by the artifact source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantArtifact {
    /// Which runtime build this is.
    pub tag: VariantTag,
    /// Version string parsed from the artifact filename by the source.
    pub version: String,
    /// Absolute path of the artifact.
    pub path: PathBuf,
    /// Observed modification time (Unix milliseconds).
    pub modified_ms: i64,
    /// Artifact size in bytes.
    pub size_bytes: u64,
}

impl VariantArtifact {
    /// The artifact's filename.
    pub fn filename(&self) -> &str {
        file_name(&self.path)
    }
}

/// A compressed bundle observed by the artifact source.
///
/// `counterpart_path` is the compressed filename with the compression
/// suffix removed. The counterpart may not exist on disk; resolution
/// treats that as a per-resource failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleArtifact {
    /// Resource name this bundle publishes under.
    pub name: String,
    /// The compressed file that installers download.
    pub compressed_path: PathBuf,
    /// The decompressed payload that checksums are computed over.
    pub counterpart_path: PathBuf,
}

impl BundleArtifact {
    /// The compressed file's name, used in download URLs.
    pub fn filename(&self) -> &str {
        file_name(&self.compressed_path)
    }
}

/// A refreshed dated feed supplied by the definition source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedArtifact {
    /// Resource name this feed publishes under.
    pub name: String,
    /// The consolidated dataset file.
    pub path: PathBuf,
    /// Upstream-declared date token, taken verbatim.
    pub date: DateToken,
}

impl FeedArtifact {
    /// The dataset file's name.
    pub fn filename(&self) -> &str {
        file_name(&self.path)
    }
}

/// A freshly observed candidate artifact, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateArtifact {
    /// A primary application build.
    PrimaryVariant(VariantArtifact),
    /// A compressed bundle resource.
    CompressedBundle(BundleArtifact),
    /// A dated feed resource.
    DatedFeed(FeedArtifact),
}

impl CandidateArtifact {
    /// The artifact's kind tag.
    pub fn kind(&self) -> ArtifactKind {
        match self {
            CandidateArtifact::PrimaryVariant(_) => ArtifactKind::PrimaryVariant,
            CandidateArtifact::CompressedBundle(_) => ArtifactKind::CompressedBundle,
            CandidateArtifact::DatedFeed(_) => ArtifactKind::DatedFeed,
        }
    }

    /// The primary on-disk path of the artifact.
    pub fn path(&self) -> &Path {
        match self {
            CandidateArtifact::PrimaryVariant(v) => &v.path,
            CandidateArtifact::CompressedBundle(b) => &b.compressed_path,
            CandidateArtifact::DatedFeed(f) => &f.path,
        }
    }
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}
