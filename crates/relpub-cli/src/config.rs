//! Configuration types deserialized from `relpub.toml`.
//!
//! The file is read once at startup and converted into the plain config
//! structs each component takes in its constructor. Relative paths are
//! resolved against the configuration file's directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use relpub_core::VariantTag;
use relpub_engine::{EngineConfig, PublishLayout, ResourceMeta};
use relpub_sources::{BundleScan, FeedConfig, ScanConfig};

/// Errors while loading `relpub.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("missing or empty field: {0}")]
    MissingField(String),
}

/// The top-level configuration parsed from `relpub.toml`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Application naming and variant tokens.
    pub app: AppConfig,
    /// Directory and file locations.
    pub paths: PathsConfig,
    /// Published download-channel URL bases.
    pub publish: PublishConfig,
    /// Compressed bundle resource, when the project ships one.
    pub bundle: Option<BundleConfig>,
    /// Dated feed resource, when the project ships one.
    pub feed: Option<FeedTomlConfig>,
    /// Git delivery settings; omit to publish to the filesystem only.
    pub git: Option<GitConfig>,
}

/// `[app]` section.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Artifact filename prefix (the application name).
    pub prefix: String,
    /// Artifact filename extension, including the dot.
    pub extension: String,
    /// Filename token of the legacy-runtime build.
    pub legacy_token: String,
    /// Filename token of the current-runtime build.
    pub current_token: String,
    /// Whether installers must take application updates.
    #[serde(default)]
    pub required: bool,
}

/// `[paths]` section.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Directory holding freshly built application artifacts.
    pub artifact_dir: PathBuf,
    /// Directory holding resource data files.
    pub data_dir: PathBuf,
    /// Directory holding downloaded feed segments.
    #[serde(default)]
    pub segment_dir: Option<PathBuf>,
    /// The published manifest location.
    pub manifest: PathBuf,
}

/// `[publish]` section: URL bases per channel.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublishConfig {
    pub app_release_base: String,
    pub app_mirror_base: String,
    pub resource_release_base: String,
    pub resource_raw_base: String,
    pub resource_mirror_base: String,
}

/// `[bundle]` section.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BundleConfig {
    /// Resource name.
    pub name: String,
    /// Bundle filename stem in the data directory.
    pub stem: String,
    /// Compression suffix (default `.gzip`).
    #[serde(default = "default_compression_suffix")]
    pub compression_suffix: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    /// Install-local filename; defaults to the decompressed filename.
    #[serde(default)]
    pub local_path: Option<String>,
    #[serde(default = "default_bundle_headroom")]
    pub min_disk_headroom_bytes: u64,
}

/// `[feed]` section.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedTomlConfig {
    /// Resource name and output filename stem.
    pub name: String,
    /// Filename prefix of the primary segment.
    pub primary_prefix: String,
    /// Filename prefix of the optional custom overlay segment.
    #[serde(default)]
    pub custom_prefix: Option<String>,
    /// Header row written to the consolidated dataset.
    pub header: Vec<String>,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub local_path: Option<String>,
    #[serde(default = "default_feed_headroom")]
    pub min_disk_headroom_bytes: u64,
}

/// `[git]` section.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitConfig {
    /// Repository working copy the changed paths live in.
    pub repo_dir: PathBuf,
    #[serde(default = "default_remote")]
    pub remote: String,
    #[serde(default = "default_branch")]
    pub branch: String,
}

fn default_compression_suffix() -> String {
    ".gzip".to_string()
}

fn default_bundle_headroom() -> u64 {
    relpub_engine::config::BUNDLE_DISK_HEADROOM_BYTES
}

fn default_feed_headroom() -> u64 {
    relpub_engine::config::FEED_DISK_HEADROOM_BYTES
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

/// Load and validate `relpub.toml`, resolving relative paths against the
/// file's directory.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut config = load_config_from_str(&contents)?;
    let base = path.parent().unwrap_or(Path::new("."));
    config.resolve_paths(base);
    Ok(config)
}

/// Parse and validate a configuration from a string (no path resolution).
pub fn load_config_from_str(contents: &str) -> Result<Config, ConfigError> {
    let config: Config =
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let required = [
        ("app.prefix", &config.app.prefix),
        ("app.extension", &config.app.extension),
        ("app.legacy_token", &config.app.legacy_token),
        ("app.current_token", &config.app.current_token),
        ("publish.app_release_base", &config.publish.app_release_base),
        ("publish.app_mirror_base", &config.publish.app_mirror_base),
    ];
    for (field, value) in required {
        if value.is_empty() {
            return Err(ConfigError::MissingField(field.to_string()));
        }
    }
    if let Some(feed) = &config.feed {
        if feed.header.is_empty() {
            return Err(ConfigError::MissingField("feed.header".to_string()));
        }
    }
    Ok(())
}

impl Config {
    fn resolve_paths(&mut self, base: &Path) {
        for path in [
            &mut self.paths.artifact_dir,
            &mut self.paths.data_dir,
            &mut self.paths.manifest,
        ] {
            resolve(path, base);
        }
        if let Some(segment_dir) = &mut self.paths.segment_dir {
            resolve(segment_dir, base);
        }
        if let Some(git) = &mut self.git {
            resolve(&mut git.repo_dir, base);
        }
    }

    /// The engine's view of this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        let mut resources = BTreeMap::new();
        if let Some(bundle) = &self.bundle {
            resources.insert(
                bundle.name.clone(),
                ResourceMeta {
                    display_name: bundle.display_name.clone(),
                    description: bundle.description.clone(),
                    required: bundle.required,
                    local_path: bundle.local_path.clone(),
                    min_disk_headroom_bytes: bundle.min_disk_headroom_bytes,
                },
            );
        }
        if let Some(feed) = &self.feed {
            resources.insert(
                feed.name.clone(),
                ResourceMeta {
                    display_name: feed.display_name.clone(),
                    description: feed.description.clone(),
                    required: feed.required,
                    local_path: feed.local_path.clone(),
                    min_disk_headroom_bytes: feed.min_disk_headroom_bytes,
                },
            );
        }
        EngineConfig {
            manifest_path: self.paths.manifest.clone(),
            app_required: self.app.required,
            publish: PublishLayout {
                app_release_base: self.publish.app_release_base.clone(),
                app_mirror_base: self.publish.app_mirror_base.clone(),
                resource_release_base: self.publish.resource_release_base.clone(),
                resource_raw_base: self.publish.resource_raw_base.clone(),
                resource_mirror_base: self.publish.resource_mirror_base.clone(),
            },
            resources,
        }
    }

    /// The artifact scanner's view of this configuration.
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            artifact_dir: self.paths.artifact_dir.clone(),
            data_dir: self.paths.data_dir.clone(),
            app_prefix: self.app.prefix.clone(),
            artifact_ext: self.app.extension.clone(),
            variant_tokens: vec![
                (self.app.legacy_token.clone(), VariantTag::LegacyRuntime),
                (self.app.current_token.clone(), VariantTag::CurrentRuntime),
            ],
            bundle: self.bundle.as_ref().map(|bundle| BundleScan {
                name: bundle.name.clone(),
                stem: bundle.stem.clone(),
                compression_suffix: bundle.compression_suffix.clone(),
            }),
        }
    }

    /// The feed source's view of this configuration, when one is set up.
    pub fn feed_config(&self) -> Option<FeedConfig> {
        let feed = self.feed.as_ref()?;
        let segment_dir = self
            .paths
            .segment_dir
            .clone()
            .unwrap_or_else(|| self.paths.data_dir.join("segments"));
        Some(FeedConfig {
            segment_dir,
            data_dir: self.paths.data_dir.clone(),
            feed_name: feed.name.clone(),
            primary_prefix: feed.primary_prefix.clone(),
            custom_prefix: feed.custom_prefix.clone(),
            header: feed.header.clone(),
        })
    }
}

fn resolve(path: &mut PathBuf, base: &Path) {
    if path.is_relative() {
        *path = base.join(&*path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[app]
prefix = "acmetool"
extension = ".bin"
legacy_token = "legacy"
current_token = "current"

[paths]
artifact_dir = "out"
data_dir = "data"
manifest = "manifest.json"

[publish]
app_release_base = "https://github.com/acme/tool/releases/download"
app_mirror_base = "https://mirror.acme.dev/releases"
resource_release_base = "https://github.com/acme/resources/releases/download/db"
resource_raw_base = "https://raw.githubusercontent.com/acme/resources/main"
resource_mirror_base = "https://mirror.acme.dev/resources"
"#;

    #[test]
    fn test_parse_minimal_config() {
        let config = load_config_from_str(MINIMAL).unwrap();
        assert_eq!(config.app.prefix, "acmetool");
        assert!(config.bundle.is_none());
        assert!(config.feed.is_none());
        assert!(config.git.is_none());

        let scan = config.scan_config();
        assert_eq!(scan.variant_tokens.len(), 2);
        assert!(scan.bundle.is_none());
        assert!(config.feed_config().is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let full = format!(
            "{MINIMAL}\n{}",
            r#"
[bundle]
name = "assets"
stem = "assets"
display_name = "Asset database"
description = "content-addressed asset bundle"
local_path = "assets.db"

[feed]
name = "definitions"
primary_prefix = "Entries"
custom_prefix = "Custom"
header = ["published", "id", "title"]
display_name = "Definitions feed"

[git]
repo_dir = "."
"#
        );
        let config = load_config_from_str(&full).unwrap();
        let engine = config.engine_config();
        assert_eq!(engine.resources.len(), 2);
        assert_eq!(
            engine.resources["assets"].min_disk_headroom_bytes,
            relpub_engine::config::BUNDLE_DISK_HEADROOM_BYTES
        );
        assert_eq!(config.git.as_ref().unwrap().remote, "origin");
        assert_eq!(config.feed_config().unwrap().primary_prefix, "Entries");
    }

    #[test]
    fn test_missing_field_rejected() {
        let broken = MINIMAL.replace("prefix = \"acmetool\"", "prefix = \"\"");
        assert!(matches!(
            load_config_from_str(&broken),
            Err(ConfigError::MissingField(_))
        ));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let broken = format!("{MINIMAL}\nunknown_key = true\n");
        assert!(matches!(
            load_config_from_str(&broken),
            Err(ConfigError::Parse(_))
        ));
    }
}
