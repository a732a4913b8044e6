//! Filesystem artifact scanning.
//!
//! Filename pattern knowledge is confined to this collaborator. The engine
//! only ever sees artifacts already tagged with their kind and variant.
//!
//! Variant artifacts are named `{prefix}-{version}-{token}{extension}`
//! (e.g. `acmetool-1.4-legacy.bin`); compressed bundles are any file in
//! the data directory matching `{stem}*{compression_suffix}`, whose
//! decompressed counterpart is the same name with the suffix removed.

use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use relpub_core::{BundleArtifact, EventLog, VariantArtifact, VariantTag};

use crate::error::{Result, SourceError};
use crate::traits::ArtifactSource;

/// Where and how to scan for candidate artifacts.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Directory holding freshly built application artifacts.
    pub artifact_dir: PathBuf,
    /// Directory holding resource data files.
    pub data_dir: PathBuf,
    /// Artifact filename prefix (the application name).
    pub app_prefix: String,
    /// Artifact filename extension, including the dot.
    pub artifact_ext: String,
    /// Filename token per variant (e.g. `("legacy", LegacyRuntime)`).
    pub variant_tokens: Vec<(String, VariantTag)>,
    /// Bundle scan settings; `None` when the project ships no bundle.
    pub bundle: Option<BundleScan>,
}

/// How to find the compressed bundle in the data directory.
#[derive(Debug, Clone)]
pub struct BundleScan {
    /// Resource name the bundle publishes under.
    pub name: String,
    /// Bundle filename stem in the data directory.
    pub stem: String,
    /// Compression suffix stripped to derive the decompressed counterpart.
    pub compression_suffix: String,
}

/// Scans configured directories for candidate artifacts.
pub struct DirArtifactSource {
    config: ScanConfig,
}

impl DirArtifactSource {
    /// Create a source over a scan configuration.
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Parse `{prefix}-{version}-{token}{ext}` into `(version, tag)`.
    fn parse_variant_filename(&self, name: &str) -> Option<(String, VariantTag)> {
        let stem = name
            .strip_prefix(&self.config.app_prefix)?
            .strip_prefix('-')?
            .strip_suffix(&self.config.artifact_ext)?;
        for (token, tag) in &self.config.variant_tokens {
            let Some(rest) = stem.strip_suffix(token.as_str()) else {
                continue;
            };
            let Some(version) = rest.strip_suffix('-') else {
                continue;
            };
            if is_version_string(version) {
                return Some((version.to_string(), *tag));
            }
        }
        None
    }
}

fn is_version_string(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && !s.starts_with('.')
        && !s.ends_with('.')
}

impl ArtifactSource for DirArtifactSource {
    fn variant_artifacts(&self, events: &mut EventLog) -> Result<Vec<VariantArtifact>> {
        events.process(format!(
            "scanning {} for build artifacts",
            self.config.artifact_dir.display()
        ));

        if !self.config.artifact_dir.is_dir() {
            return Err(SourceError::NotFound {
                path: self.config.artifact_dir.clone(),
            });
        }

        let mut found: Vec<VariantArtifact> = Vec::new();
        for entry in std::fs::read_dir(&self.config.artifact_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some((version, tag)) = self.parse_variant_filename(name) else {
                continue;
            };
            let metadata = entry.metadata()?;
            let modified_ms = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_millis() as i64)
                .unwrap_or(0);
            found.push(VariantArtifact {
                tag,
                version,
                path: entry.path(),
                modified_ms,
                size_bytes: metadata.len(),
            });
        }

        // Newest version first, modification time breaking ties, then the
        // first hit per tag. Guarantees at most one artifact per variant.
        found.sort_by(|a, b| {
            (b.version.as_str(), b.modified_ms).cmp(&(a.version.as_str(), a.modified_ms))
        });
        let mut latest: Vec<VariantArtifact> = Vec::new();
        for artifact in found {
            if latest.iter().all(|a| a.tag != artifact.tag) {
                events.info(format!(
                    "found {}: {} ({} bytes)",
                    artifact.tag,
                    artifact.filename(),
                    artifact.size_bytes
                ));
                latest.push(artifact);
            }
        }
        latest.sort_by_key(|a| a.tag);

        if latest.is_empty() {
            events.warning(format!(
                "no artifacts matching {}-*{} found",
                self.config.app_prefix, self.config.artifact_ext
            ));
        }
        Ok(latest)
    }

    fn bundle_artifacts(&self, events: &mut EventLog) -> Result<Vec<BundleArtifact>> {
        let Some(bundle) = &self.config.bundle else {
            return Ok(Vec::new());
        };
        if !self.config.data_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names: Vec<String> = Vec::new();
        for entry in std::fs::read_dir(&self.config.data_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with(&bundle.stem)
                && name.ends_with(&bundle.compression_suffix)
                && entry.file_type()?.is_file()
            {
                names.push(name.to_string());
            }
        }
        names.sort();

        let Some(name) = names.into_iter().next() else {
            return Ok(Vec::new());
        };
        let compressed_path = self.config.data_dir.join(&name);
        let counterpart = name
            .strip_suffix(&bundle.compression_suffix)
            .unwrap_or(&name)
            .to_string();
        events.info(format!("found bundle {name}"));
        Ok(vec![BundleArtifact {
            name: bundle.name.clone(),
            compressed_path,
            counterpart_path: self.config.data_dir.join(counterpart),
        }])
    }
}
