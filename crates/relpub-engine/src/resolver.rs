//! Per-kind version resolution.
//!
//! Each artifact kind has its own policy:
//!
//! - **Primary variants** carry an externally supplied version string; when
//!   both variants are present, the later-modified one's string wins as
//!   the overall application version.
//! - **Dated feeds** are versioned by their upstream date token, verbatim.
//!   Content hashes play no part, so feed digests are deferred until a
//!   publish actually happens.
//! - **Compressed bundles** take an embedded filename date token when one
//!   exists; otherwise the decompressed counterpart is hashed and, when it
//!   matches the previously published checksum, the previous version token
//!   is retained so an unchanged bundle never bumps its version.

use std::collections::BTreeMap;
use std::path::PathBuf;

use relpub_core::{
    BundleArtifact, ContentDigest, DateToken, EventLog, FeedArtifact, ManifestDocument,
    ResolvedVersion, VariantArtifact, VariantTag,
};

use crate::config::ResourceMeta;
use crate::digest::DigestService;
use crate::error::{EngineError, Result};

/// The two auxiliary resource kinds that end up in `resources`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Versioned by embedded date token or decompressed-content hash.
    CompressedBundle,
    /// Versioned solely by upstream date token.
    DatedFeed,
}

/// One resolved primary variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVariant {
    /// Which runtime build this is.
    pub tag: VariantTag,
    /// Filename used in download URLs.
    pub filename: String,
    /// Local artifact path.
    pub path: PathBuf,
    /// Payload digest.
    pub digest: ContentDigest,
}

/// The resolved primary application: one version, one file per present
/// variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedApp {
    /// The overall application version.
    pub version: String,
    /// Resolved files keyed by variant, in stable tag order.
    pub files: BTreeMap<VariantTag, ResolvedVariant>,
}

/// Compression facts for a bundle's download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedInfo {
    /// Compression algorithm name, as published.
    pub compression_type: String,
    /// Size of the compressed download in bytes. Never the decompressed
    /// size.
    pub download_size: u64,
}

/// The file behind a resolved resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceFile {
    /// Upstream filename used in download URLs.
    pub filename: String,
    /// Local path of the downloadable file (the compressed file for
    /// bundles, the dataset for feeds).
    pub path: PathBuf,
    /// Install-local filename.
    pub local_path: String,
    /// Payload digest (decompressed payload for bundles). `None` for a
    /// feed until the pipeline materializes it right before building.
    pub digest: Option<ContentDigest>,
    /// Present when the download is compressed.
    pub compressed: Option<CompressedInfo>,
}

/// One fully resolved auxiliary resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResource {
    /// Resolution policy kind.
    pub kind: ResourceKind,
    /// Stable resource name.
    pub name: String,
    /// Human-readable name.
    pub display_name: String,
    /// Human-readable description.
    pub description: String,
    /// Whether installers must fetch this resource.
    pub required: bool,
    /// Resolved version token.
    pub version: String,
    /// Headroom added to the payload size for `minDiskSpaceBytes`.
    pub min_disk_headroom_bytes: u64,
    /// The resource's file.
    pub file: ResourceFile,
}

impl ResolvedResource {
    /// The view the change detector consumes: a feed's digest is always
    /// absent because its content is never diffed.
    pub fn resolved_version(&self) -> ResolvedVersion {
        ResolvedVersion {
            resource_key: self.name.clone(),
            token: self.version.clone(),
            digest: match self.kind {
                ResourceKind::DatedFeed => None,
                ResourceKind::CompressedBundle => self.file.digest,
            },
        }
    }
}

/// Resolves versions for candidate artifacts against the previous
/// manifest.
pub struct VersionResolver<'a, D: DigestService> {
    digester: &'a D,
    previous: Option<&'a ManifestDocument>,
    today: DateToken,
}

impl<'a, D: DigestService> VersionResolver<'a, D> {
    /// Create a resolver. `today` is injected so resolution stays a pure
    /// function of its inputs.
    pub fn new(digester: &'a D, previous: Option<&'a ManifestDocument>, today: DateToken) -> Self {
        Self {
            digester,
            previous,
            today,
        }
    }

    /// Resolve the primary application from its present variants.
    ///
    /// A missing variant is a warning, not a failure; zero variants abort
    /// the run. When both are present the later-modified variant's version
    /// string becomes the application version, while both digests are
    /// recorded independently.
    pub fn resolve_app(
        &self,
        variants: &[VariantArtifact],
        events: &mut EventLog,
    ) -> Result<ResolvedApp> {
        events.process("resolving application artifacts");

        let mut files = BTreeMap::new();
        let mut newest: Option<&VariantArtifact> = None;

        for variant in variants {
            let digest = self.digester.digest(&variant.path)?;
            events.info(format!(
                "{}: {} ({} bytes)",
                variant.tag,
                variant.filename(),
                digest.size_bytes
            ));
            files.insert(
                variant.tag,
                ResolvedVariant {
                    tag: variant.tag,
                    filename: variant.filename().to_string(),
                    path: variant.path.clone(),
                    digest,
                },
            );
            let newer = match newest {
                Some(current) => variant.modified_ms > current.modified_ms,
                None => true,
            };
            if newer {
                newest = Some(variant);
            }
        }

        let Some(newest) = newest else {
            return Err(EngineError::NoVariants);
        };

        for tag in VariantTag::ALL {
            if !files.contains_key(&tag) {
                events.warning(format!(
                    "no {tag} artifact found; publishing {} only",
                    tag.other()
                ));
            }
        }

        let version = newest.version.clone();
        events.success(format!("resolved application version {version}"));
        Ok(ResolvedApp { version, files })
    }

    /// Resolve a compressed bundle. Returns `Ok(None)` when the resource
    /// must be omitted from this run (counterpart missing or unreadable);
    /// the pipeline keeps going either way.
    pub fn resolve_bundle(
        &self,
        bundle: &BundleArtifact,
        meta: &ResourceMeta,
        events: &mut EventLog,
    ) -> Result<Option<ResolvedResource>> {
        events.process(format!("resolving bundle {}", bundle.name));

        if !bundle.counterpart_path.exists() {
            let err = EngineError::PolicyAmbiguity {
                name: bundle.name.clone(),
                counterpart: bundle.counterpart_path.clone(),
            };
            tracing::warn!(resource = %bundle.name, "{err}");
            events.warning(format!("{err}; resource omitted this run"));
            return Ok(None);
        }

        let digest = match self.digester.digest(&bundle.counterpart_path) {
            Ok(digest) => digest,
            Err(err) => {
                tracing::warn!(resource = %bundle.name, "{err}");
                events.warning(format!(
                    "bundle {}: {err}; resource omitted this run",
                    bundle.name
                ));
                return Ok(None);
            }
        };

        let download_size = match std::fs::metadata(&bundle.compressed_path) {
            Ok(stat) => stat.len(),
            Err(err) => {
                events.warning(format!(
                    "bundle {}: cannot stat {}: {err}; resource omitted this run",
                    bundle.name,
                    bundle.compressed_path.display()
                ));
                return Ok(None);
            }
        };

        let filename = bundle.filename().to_string();
        let previous = self.previous.and_then(|m| m.resource(&bundle.name));

        let version = if let Some(token) = DateToken::find_in_filename(&filename) {
            // Embedded date wins outright; content hash is irrelevant to
            // versioning in this branch.
            token.into_string()
        } else {
            match previous {
                Some(prev) if prev.files.checksum.sha256 == digest.sha256 => {
                    events.info(format!(
                        "bundle {} content unchanged; keeping version {}",
                        bundle.name, prev.version
                    ));
                    prev.version.clone()
                }
                Some(prev) => {
                    events.info(format!(
                        "bundle {} content changed: version {} -> {}",
                        bundle.name, prev.version, self.today
                    ));
                    self.today.as_str().to_string()
                }
                None => self.today.as_str().to_string(),
            }
        };

        events.info(format!(
            "bundle {}: {download_size} bytes compressed, {} bytes decompressed",
            bundle.name, digest.size_bytes
        ));

        let counterpart_name = bundle
            .counterpart_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&filename)
            .to_string();

        Ok(Some(ResolvedResource {
            kind: ResourceKind::CompressedBundle,
            name: bundle.name.clone(),
            display_name: meta.display_name.clone(),
            description: meta.description.clone(),
            required: meta.required,
            version,
            min_disk_headroom_bytes: meta.min_disk_headroom_bytes,
            file: ResourceFile {
                filename,
                path: bundle.compressed_path.clone(),
                local_path: meta.local_path.clone().unwrap_or(counterpart_name),
                digest: Some(digest),
                compressed: Some(CompressedInfo {
                    compression_type: "gzip".to_string(),
                    download_size,
                }),
            },
        }))
    }

    /// Resolve a dated feed: the upstream token is authoritative and the
    /// content is never hashed here.
    pub fn resolve_feed(
        &self,
        feed: &FeedArtifact,
        meta: &ResourceMeta,
        events: &mut EventLog,
    ) -> ResolvedResource {
        events.success(format!("feed {} at version {}", feed.name, feed.date));
        let filename = feed.filename().to_string();
        ResolvedResource {
            kind: ResourceKind::DatedFeed,
            name: feed.name.clone(),
            display_name: meta.display_name.clone(),
            description: meta.description.clone(),
            required: meta.required,
            version: feed.date.as_str().to_string(),
            min_disk_headroom_bytes: meta.min_disk_headroom_bytes,
            file: ResourceFile {
                local_path: meta.local_path.clone().unwrap_or_else(|| filename.clone()),
                filename,
                path: feed.path.clone(),
                digest: None,
                compressed: None,
            },
        }
    }
}
