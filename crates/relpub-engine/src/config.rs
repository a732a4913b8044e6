//! Engine configuration.
//!
//! Constructed once by the caller (the CLI reads `relpub.toml`) and passed
//! into each component; there is no process-wide mutable configuration.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::resolver::ResourceKind;

/// Default free-space headroom added on top of a bundle's decompressed size.
pub const BUNDLE_DISK_HEADROOM_BYTES: u64 = 200_000_000;

/// Default free-space headroom added on top of a feed's size.
pub const FEED_DISK_HEADROOM_BYTES: u64 = 10_000_000;

/// Configuration for one engine run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Where the previous manifest is read from (and the new one will be
    /// persisted to by the publish sink).
    pub manifest_path: PathBuf,
    /// Whether installers must take application updates.
    pub app_required: bool,
    /// URL bases for the published download channels.
    pub publish: PublishLayout,
    /// Per-resource presentation metadata, keyed by resource name.
    /// Resources without an entry fall back to [`ResourceMeta::fallback`].
    pub resources: BTreeMap<String, ResourceMeta>,
}

/// URL bases the builder assembles download channels from.
///
/// Every file gets a `github` and a `mirror` channel; application
/// artifacts live under a versioned release path, resources under flat
/// bases.
#[derive(Debug, Clone)]
pub struct PublishLayout {
    /// Base for application release downloads (`{base}/v{version}/{file}`).
    pub app_release_base: String,
    /// Mirror base for application downloads (`{base}/{file}`).
    pub app_mirror_base: String,
    /// Base for compressed bundle release assets.
    pub resource_release_base: String,
    /// Base for raw feed files.
    pub resource_raw_base: String,
    /// Mirror base for all resources.
    pub resource_mirror_base: String,
}

/// Presentation and policy metadata for one resource.
#[derive(Debug, Clone)]
pub struct ResourceMeta {
    /// Human-readable name shown by installers.
    pub display_name: String,
    /// Human-readable description.
    pub description: String,
    /// Whether installers must fetch this resource.
    pub required: bool,
    /// Install-local filename. `None` derives it from the upstream file.
    pub local_path: Option<String>,
    /// Free-space headroom added to the payload size for
    /// `minDiskSpaceBytes`.
    pub min_disk_headroom_bytes: u64,
}

impl ResourceMeta {
    /// Metadata for a resource the configuration does not mention.
    pub fn fallback(name: &str, kind: ResourceKind) -> Self {
        Self {
            display_name: name.to_string(),
            description: String::new(),
            required: false,
            local_path: None,
            min_disk_headroom_bytes: match kind {
                ResourceKind::CompressedBundle => BUNDLE_DISK_HEADROOM_BYTES,
                ResourceKind::DatedFeed => FEED_DISK_HEADROOM_BYTES,
            },
        }
    }
}

impl EngineConfig {
    /// Metadata for a named resource, falling back to defaults.
    pub fn meta_for(&self, name: &str, kind: ResourceKind) -> ResourceMeta {
        self.resources
            .get(name)
            .cloned()
            .unwrap_or_else(|| ResourceMeta::fallback(name, kind))
    }
}
