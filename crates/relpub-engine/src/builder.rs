//! Deterministic manifest assembly.
//!
//! `build` is a pure function of its inputs, including the injected `now`.
//! Given identical inputs it returns a document whose serialized form is
//! byte-identical: struct fields have fixed order and every mapping is a
//! `BTreeMap`. Absent variants and resources are simply omitted.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use relpub_core::manifest::{
    AppDescriptor, FileDescriptor, ManifestDocument, ResourceDescriptor, SCHEMA_VERSION,
};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::resolver::{ResolvedApp, ResolvedResource, ResourceKind};

/// Assembles manifest documents from resolved state.
pub struct ManifestBuilder<'a> {
    config: &'a EngineConfig,
}

impl<'a> ManifestBuilder<'a> {
    /// Create a builder over the publish configuration.
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Build the new manifest document.
    ///
    /// `previous` is consulted for one thing only: when the application
    /// version is unchanged, `releaseDate` is carried forward so a
    /// resource-only publish does not restamp the app's release date.
    /// `changelog` defaults to a minimal three-line entry when empty.
    pub fn build(
        &self,
        previous: Option<&ManifestDocument>,
        app: &ResolvedApp,
        resources: &[ResolvedResource],
        changelog: Option<&[String]>,
        now: DateTime<Utc>,
    ) -> Result<ManifestDocument> {
        let layout = &self.config.publish;

        let changelog = match changelog {
            Some(lines) if !lines.is_empty() => lines.to_vec(),
            _ => vec![
                format!("update time: {}", now.format("%Y-%m-%d %H:%M:%S")),
                "application artifacts updated".to_string(),
                "resource data refreshed".to_string(),
            ],
        };

        let release_date = match previous {
            Some(prev) if prev.app.version == app.version => prev.app.release_date.clone(),
            _ => now.format("%Y-%m-%d").to_string(),
        };

        let mut files = BTreeMap::new();
        for (tag, variant) in &app.files {
            let urls = BTreeMap::from([
                (
                    "github".to_string(),
                    format!(
                        "{}/v{}/{}",
                        layout.app_release_base, app.version, variant.filename
                    ),
                ),
                (
                    "mirror".to_string(),
                    format!("{}/{}", layout.app_mirror_base, variant.filename),
                ),
            ]);
            files.insert(
                *tag,
                FileDescriptor {
                    urls,
                    size: variant.digest.size_bytes,
                    checksum: (&variant.digest).into(),
                    compressed: false,
                    compression_type: None,
                    uncompressed_size: None,
                    local_path: None,
                    min_disk_space_bytes: None,
                },
            );
        }

        let mut descriptors = Vec::with_capacity(resources.len());
        for resource in resources {
            descriptors.push(self.resource_descriptor(resource)?);
        }

        Ok(ManifestDocument {
            schema_version: SCHEMA_VERSION.to_string(),
            last_update: now.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            app: AppDescriptor {
                version: app.version.clone(),
                release_date,
                changelog,
                required: self.config.app_required,
                files,
            },
            resources: descriptors,
        })
    }

    fn resource_descriptor(&self, resource: &ResolvedResource) -> Result<ResourceDescriptor> {
        let layout = &self.config.publish;
        let digest = resource
            .file
            .digest
            .as_ref()
            .ok_or_else(|| EngineError::MissingDigest {
                name: resource.name.clone(),
            })?;

        let release_base = match resource.kind {
            ResourceKind::CompressedBundle => &layout.resource_release_base,
            ResourceKind::DatedFeed => &layout.resource_raw_base,
        };
        let urls = BTreeMap::from([
            (
                "github".to_string(),
                format!("{}/{}", release_base, resource.file.filename),
            ),
            (
                "mirror".to_string(),
                format!("{}/{}", layout.resource_mirror_base, resource.file.filename),
            ),
        ]);

        let (size, compressed, compression_type, uncompressed_size) =
            match &resource.file.compressed {
                Some(info) => (
                    info.download_size,
                    true,
                    Some(info.compression_type.clone()),
                    Some(digest.size_bytes),
                ),
                None => (digest.size_bytes, false, None, None),
            };

        Ok(ResourceDescriptor {
            name: resource.name.clone(),
            display_name: resource.display_name.clone(),
            version: resource.version.clone(),
            required: resource.required,
            description: resource.description.clone(),
            files: FileDescriptor {
                urls,
                size,
                checksum: digest.into(),
                compressed,
                compression_type,
                uncompressed_size,
                local_path: Some(resource.file.local_path.clone()),
                min_disk_space_bytes: Some(digest.size_bytes + resource.min_disk_headroom_bytes),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use chrono::TimeZone;
    use relpub_core::{ContentDigest, Md5Digest, Sha256Digest, VariantTag};

    use crate::config::{PublishLayout, ResourceMeta};
    use crate::resolver::{CompressedInfo, ResolvedVariant, ResourceFile};

    fn config() -> EngineConfig {
        EngineConfig {
            manifest_path: PathBuf::from("manifest.json"),
            app_required: false,
            publish: PublishLayout {
                app_release_base: "https://github.com/acme/tool/releases/download".to_string(),
                app_mirror_base: "https://mirror.acme.dev/releases".to_string(),
                resource_release_base: "https://github.com/acme/resources/releases/download/db"
                    .to_string(),
                resource_raw_base: "https://raw.githubusercontent.com/acme/resources/main"
                    .to_string(),
                resource_mirror_base: "https://mirror.acme.dev/resources".to_string(),
            },
            resources: [(
                "assets".to_string(),
                ResourceMeta {
                    display_name: "Asset database".to_string(),
                    description: "content-addressed asset bundle".to_string(),
                    required: false,
                    local_path: Some("assets.db".to_string()),
                    min_disk_headroom_bytes: 1000,
                },
            )]
            .into(),
        }
    }

    fn digest(seed: u8, size: u64) -> ContentDigest {
        ContentDigest {
            size_bytes: size,
            sha256: Sha256Digest::from_bytes([seed; 32]),
            md5: Md5Digest::from_bytes([seed; 16]),
        }
    }

    fn resolved_app() -> ResolvedApp {
        ResolvedApp {
            version: "1.4".to_string(),
            files: [(
                VariantTag::LegacyRuntime,
                ResolvedVariant {
                    tag: VariantTag::LegacyRuntime,
                    filename: "tool-1.4-legacy.bin".to_string(),
                    path: PathBuf::from("/out/tool-1.4-legacy.bin"),
                    digest: digest(1, 2048),
                },
            )]
            .into(),
        }
    }

    fn bundle() -> ResolvedResource {
        ResolvedResource {
            kind: ResourceKind::CompressedBundle,
            name: "assets".to_string(),
            display_name: "Asset database".to_string(),
            description: "content-addressed asset bundle".to_string(),
            required: false,
            version: "20250110".to_string(),
            min_disk_headroom_bytes: 1000,
            file: ResourceFile {
                filename: "assets.db.gzip".to_string(),
                path: PathBuf::from("/data/assets.db.gzip"),
                local_path: "assets.db".to_string(),
                digest: Some(digest(7, 5000)),
                compressed: Some(CompressedInfo {
                    compression_type: "gzip".to_string(),
                    download_size: 1200,
                }),
            },
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_build_is_byte_deterministic() {
        let config = config();
        let builder = ManifestBuilder::new(&config);
        let app = resolved_app();
        let resources = vec![bundle()];

        let a = builder
            .build(None, &app, &resources, None, fixed_now())
            .unwrap();
        let b = builder
            .build(None, &app, &resources, None, fixed_now())
            .unwrap();
        assert_eq!(a.to_json_bytes().unwrap(), b.to_json_bytes().unwrap());
    }

    #[test]
    fn test_compressed_size_separation() {
        let config = config();
        let builder = ManifestBuilder::new(&config);
        let doc = builder
            .build(None, &resolved_app(), &[bundle()], None, fixed_now())
            .unwrap();

        let files = &doc.resources[0].files;
        assert_eq!(files.size, 1200);
        assert_eq!(files.uncompressed_size, Some(5000));
        assert!(files.compressed);
        assert_eq!(files.compression_type.as_deref(), Some("gzip"));
        assert_eq!(files.min_disk_space_bytes, Some(6000));
    }

    #[test]
    fn test_app_urls_embed_version() {
        let config = config();
        let builder = ManifestBuilder::new(&config);
        let doc = builder
            .build(None, &resolved_app(), &[], None, fixed_now())
            .unwrap();

        let file = doc.variant_file(VariantTag::LegacyRuntime).unwrap();
        assert_eq!(
            file.urls["github"],
            "https://github.com/acme/tool/releases/download/v1.4/tool-1.4-legacy.bin"
        );
        assert_eq!(
            file.urls["mirror"],
            "https://mirror.acme.dev/releases/tool-1.4-legacy.bin"
        );
        // App files carry no resource-only fields.
        assert_eq!(file.local_path, None);
        assert_eq!(file.min_disk_space_bytes, None);
        assert!(!file.compressed);
    }

    #[test]
    fn test_default_changelog_has_three_lines() {
        let config = config();
        let builder = ManifestBuilder::new(&config);
        let doc = builder
            .build(None, &resolved_app(), &[], None, fixed_now())
            .unwrap();
        assert_eq!(doc.app.changelog.len(), 3);
        assert!(doc.app.changelog[0].contains("2025-06-01 12:30:00"));
    }

    #[test]
    fn test_supplied_changelog_is_used() {
        let config = config();
        let builder = ManifestBuilder::new(&config);
        let lines = vec!["fixed the thing".to_string()];
        let doc = builder
            .build(None, &resolved_app(), &[], Some(&lines), fixed_now())
            .unwrap();
        assert_eq!(doc.app.changelog, lines);
    }

    #[test]
    fn test_release_date_carried_forward_when_version_unchanged() {
        let config = config();
        let builder = ManifestBuilder::new(&config);
        let app = resolved_app();

        let first = builder.build(None, &app, &[], None, fixed_now()).unwrap();
        assert_eq!(first.app.release_date, "2025-06-01");

        let later = Utc.with_ymd_and_hms(2025, 7, 15, 9, 0, 0).unwrap();
        let second = builder.build(Some(&first), &app, &[], None, later).unwrap();
        assert_eq!(second.app.release_date, "2025-06-01");

        let mut bumped = app.clone();
        bumped.version = "1.5".to_string();
        let third = builder
            .build(Some(&first), &bumped, &[], None, later)
            .unwrap();
        assert_eq!(third.app.release_date, "2025-07-15");
    }

    #[test]
    fn test_missing_digest_is_an_error() {
        let config = config();
        let builder = ManifestBuilder::new(&config);
        let mut resource = bundle();
        resource.file.digest = None;
        let err = builder
            .build(None, &resolved_app(), &[resource], None, fixed_now())
            .unwrap_err();
        assert!(matches!(err, EngineError::MissingDigest { .. }));
    }

    #[test]
    fn test_last_update_format() {
        let config = config();
        let builder = ManifestBuilder::new(&config);
        let doc = builder
            .build(None, &resolved_app(), &[], None, fixed_now())
            .unwrap();
        assert_eq!(doc.last_update, "2025-06-01T12:30:00Z");
        assert_eq!(doc.schema_version, SCHEMA_VERSION);
    }
}
