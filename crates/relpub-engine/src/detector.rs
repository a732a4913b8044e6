//! Change detection against the previously published manifest.
//!
//! Rules are evaluated independently; any hit marks the run as changed.
//! Reasons are accumulated in a fixed order (app version, then variants in
//! tag order, then resources in supplied order) so identical inputs always
//! produce an identical reasons list.
//!
//! The per-kind asymmetry is deliberate: variants and bundles are compared
//! by strong hash, dated feeds only by version token. Two feeds with the
//! same token are unchanged even if their bytes differ.

use relpub_core::{ManifestDocument, VariantTag};

use crate::resolver::{ResolvedApp, ResolvedResource, ResourceKind};

/// The detector's verdict for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeReport {
    /// Whether anything changed since the previous publish.
    pub changed: bool,
    /// Human-readable reasons, in stable order. Empty iff unchanged.
    pub reasons: Vec<String>,
}

/// Compare the previous manifest against the resolved candidate state.
pub fn detect(
    previous: Option<&ManifestDocument>,
    app: &ResolvedApp,
    resources: &[ResolvedResource],
) -> ChangeReport {
    let Some(previous) = previous else {
        return ChangeReport {
            changed: true,
            reasons: vec!["first publish".to_string()],
        };
    };

    let mut reasons = Vec::new();

    if previous.app.version != app.version {
        reasons.push(format!(
            "application version changed: {} -> {}",
            previous.app.version, app.version
        ));
    }

    for tag in VariantTag::ALL {
        match (app.files.get(&tag), previous.variant_file(tag)) {
            (Some(now), Some(before)) => {
                if now.digest.sha256 != before.checksum.sha256 {
                    reasons.push(format!("{tag} artifact updated"));
                }
            }
            (Some(_), None) => reasons.push(format!("{tag} variant added")),
            (None, Some(_)) => reasons.push(format!("{tag} variant removed")),
            (None, None) => {}
        }
    }

    for resource in resources {
        let before = previous.resource(&resource.name);
        // The resolved-version view already encodes the policy asymmetry:
        // a feed's digest is absent, so feeds can only ever be compared by
        // token.
        let resolved = resource.resolved_version();
        match resource.kind {
            ResourceKind::DatedFeed => match before {
                Some(prev) if prev.version != resolved.token => {
                    reasons.push(format!(
                        "{} feed updated: {} -> {}",
                        resolved.resource_key, prev.version, resolved.token
                    ));
                }
                Some(_) => {}
                None => reasons.push(format!(
                    "{} feed added at version {}",
                    resolved.resource_key, resolved.token
                )),
            },
            ResourceKind::CompressedBundle => match (before, &resolved.digest) {
                (Some(prev), Some(digest)) => {
                    if prev.files.checksum.sha256 != digest.sha256 {
                        reasons.push(format!("{} bundle content changed", resolved.resource_key));
                    }
                }
                (None, _) => {
                    // New name alone is a change, independent of any hash.
                    reasons.push(format!("{}: first addition", resolved.resource_key));
                }
                (Some(_), None) => {}
            },
        }
    }

    ChangeReport {
        changed: !reasons.is_empty(),
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use relpub_core::manifest::{
        AppDescriptor, Checksum, FileDescriptor, ResourceDescriptor, SCHEMA_VERSION,
    };
    use relpub_core::{ContentDigest, Md5Digest, Sha256Digest};

    use crate::resolver::{CompressedInfo, ResolvedVariant, ResourceFile};

    fn digest(seed: u8) -> ContentDigest {
        ContentDigest {
            size_bytes: 100,
            sha256: Sha256Digest::from_bytes([seed; 32]),
            md5: Md5Digest::from_bytes([seed; 16]),
        }
    }

    fn descriptor(seed: u8) -> FileDescriptor {
        FileDescriptor {
            urls: BTreeMap::new(),
            size: 100,
            checksum: Checksum {
                sha256: Sha256Digest::from_bytes([seed; 32]),
                md5: Md5Digest::from_bytes([seed; 16]),
            },
            compressed: false,
            compression_type: None,
            uncompressed_size: None,
            local_path: None,
            min_disk_space_bytes: None,
        }
    }

    fn resolved_app(version: &str, variants: &[(VariantTag, u8)]) -> ResolvedApp {
        ResolvedApp {
            version: version.to_string(),
            files: variants
                .iter()
                .map(|(tag, seed)| {
                    (
                        *tag,
                        ResolvedVariant {
                            tag: *tag,
                            filename: format!("app-{version}-{tag}.bin"),
                            path: PathBuf::from(format!("/out/app-{tag}.bin")),
                            digest: digest(*seed),
                        },
                    )
                })
                .collect(),
        }
    }

    fn previous(
        version: &str,
        variants: &[(VariantTag, u8)],
        resources: &[ResourceDescriptor],
    ) -> ManifestDocument {
        ManifestDocument {
            schema_version: SCHEMA_VERSION.to_string(),
            last_update: "2025-01-01T00:00:00Z".to_string(),
            app: AppDescriptor {
                version: version.to_string(),
                release_date: "2025-01-01".to_string(),
                changelog: vec![],
                required: false,
                files: variants
                    .iter()
                    .map(|(tag, seed)| (*tag, descriptor(*seed)))
                    .collect(),
            },
            resources: resources.to_vec(),
        }
    }

    fn feed_resource(name: &str, version: &str) -> ResolvedResource {
        ResolvedResource {
            kind: ResourceKind::DatedFeed,
            name: name.to_string(),
            display_name: name.to_string(),
            description: String::new(),
            required: false,
            version: version.to_string(),
            min_disk_headroom_bytes: 0,
            file: ResourceFile {
                filename: format!("{name}.csv"),
                path: PathBuf::from(format!("/data/{name}.csv")),
                local_path: format!("{name}.csv"),
                digest: None,
                compressed: None,
            },
        }
    }

    fn bundle_resource(name: &str, version: &str, seed: u8) -> ResolvedResource {
        ResolvedResource {
            kind: ResourceKind::CompressedBundle,
            name: name.to_string(),
            display_name: name.to_string(),
            description: String::new(),
            required: false,
            version: version.to_string(),
            min_disk_headroom_bytes: 0,
            file: ResourceFile {
                filename: format!("{name}.db.gzip"),
                path: PathBuf::from(format!("/data/{name}.db.gzip")),
                local_path: format!("{name}.db"),
                digest: Some(digest(seed)),
                compressed: Some(CompressedInfo {
                    compression_type: "gzip".to_string(),
                    download_size: 10,
                }),
            },
        }
    }

    fn feed_descriptor(name: &str, version: &str) -> ResourceDescriptor {
        ResourceDescriptor {
            name: name.to_string(),
            display_name: name.to_string(),
            version: version.to_string(),
            required: false,
            description: String::new(),
            files: descriptor(0xfe),
        }
    }

    fn bundle_descriptor(name: &str, version: &str, seed: u8) -> ResourceDescriptor {
        ResourceDescriptor {
            name: name.to_string(),
            display_name: name.to_string(),
            version: version.to_string(),
            required: false,
            description: String::new(),
            files: descriptor(seed),
        }
    }

    #[test]
    fn test_no_previous_is_first_publish() {
        let app = resolved_app("1.0", &[(VariantTag::LegacyRuntime, 1)]);
        let report = detect(None, &app, &[]);
        assert!(report.changed);
        assert_eq!(report.reasons, vec!["first publish".to_string()]);
    }

    #[test]
    fn test_identical_state_is_unchanged() {
        let app = resolved_app(
            "1.0",
            &[(VariantTag::LegacyRuntime, 1), (VariantTag::CurrentRuntime, 2)],
        );
        let prev = previous(
            "1.0",
            &[(VariantTag::LegacyRuntime, 1), (VariantTag::CurrentRuntime, 2)],
            &[feed_descriptor("definitions", "20250101")],
        );
        let report = detect(
            Some(&prev),
            &app,
            &[feed_resource("definitions", "20250101")],
        );
        assert!(!report.changed);
        assert!(report.reasons.is_empty());
    }

    #[test]
    fn test_version_change_detected() {
        let app = resolved_app("1.1", &[(VariantTag::LegacyRuntime, 1)]);
        let prev = previous("1.0", &[(VariantTag::LegacyRuntime, 1)], &[]);
        let report = detect(Some(&prev), &app, &[]);
        assert!(report.changed);
        assert_eq!(
            report.reasons,
            vec!["application version changed: 1.0 -> 1.1".to_string()]
        );
    }

    #[test]
    fn test_variant_hash_change_detected() {
        let app = resolved_app("1.0", &[(VariantTag::LegacyRuntime, 9)]);
        let prev = previous("1.0", &[(VariantTag::LegacyRuntime, 1)], &[]);
        let report = detect(Some(&prev), &app, &[]);
        assert_eq!(report.reasons, vec!["legacy-runtime artifact updated".to_string()]);
    }

    #[test]
    fn test_variant_presence_flip_detected() {
        let app = resolved_app("1.0", &[(VariantTag::CurrentRuntime, 1)]);
        let prev = previous("1.0", &[(VariantTag::LegacyRuntime, 1)], &[]);
        let report = detect(Some(&prev), &app, &[]);
        assert_eq!(
            report.reasons,
            vec![
                "legacy-runtime variant removed".to_string(),
                "current-runtime variant added".to_string(),
            ]
        );
    }

    #[test]
    fn test_feed_token_change_names_both_tokens() {
        let app = resolved_app("1.0", &[(VariantTag::LegacyRuntime, 1)]);
        let prev = previous(
            "1.0",
            &[(VariantTag::LegacyRuntime, 1)],
            &[feed_descriptor("feed", "20250101")],
        );
        let report = detect(Some(&prev), &app, &[feed_resource("feed", "20250115")]);
        assert!(report.changed);
        assert_eq!(
            report.reasons,
            vec!["feed feed updated: 20250101 -> 20250115".to_string()]
        );
    }

    #[test]
    fn test_feed_content_is_never_compared() {
        // Same token, no digest at all: unchanged by policy.
        let app = resolved_app("1.0", &[(VariantTag::LegacyRuntime, 1)]);
        let prev = previous(
            "1.0",
            &[(VariantTag::LegacyRuntime, 1)],
            &[feed_descriptor("definitions", "20250101")],
        );
        let report = detect(
            Some(&prev),
            &app,
            &[feed_resource("definitions", "20250101")],
        );
        assert!(!report.changed);
    }

    #[test]
    fn test_bundle_hash_change_detected() {
        let app = resolved_app("1.0", &[(VariantTag::LegacyRuntime, 1)]);
        let prev = previous(
            "1.0",
            &[(VariantTag::LegacyRuntime, 1)],
            &[bundle_descriptor("assets", "20250101", 3)],
        );
        let report = detect(
            Some(&prev),
            &app,
            &[bundle_resource("assets", "20250101", 4)],
        );
        assert_eq!(report.reasons, vec!["assets bundle content changed".to_string()]);
    }

    #[test]
    fn test_bundle_first_addition() {
        let app = resolved_app("1.0", &[(VariantTag::LegacyRuntime, 1)]);
        let prev = previous("1.0", &[(VariantTag::LegacyRuntime, 1)], &[]);
        let report = detect(
            Some(&prev),
            &app,
            &[bundle_resource("assets", "20250601", 3)],
        );
        assert_eq!(report.reasons, vec!["assets: first addition".to_string()]);
    }

    #[test]
    fn test_reasons_order_is_stable() {
        let app = resolved_app("2.0", &[(VariantTag::LegacyRuntime, 9)]);
        let prev = previous(
            "1.0",
            &[(VariantTag::LegacyRuntime, 1)],
            &[
                bundle_descriptor("assets", "20250101", 3),
                feed_descriptor("definitions", "20250101"),
            ],
        );
        let resources = vec![
            bundle_resource("assets", "20250601", 4),
            feed_resource("definitions", "20250115"),
        ];

        let first = detect(Some(&prev), &app, &resources);
        let second = detect(Some(&prev), &app, &resources);
        assert_eq!(first, second);
        assert_eq!(
            first.reasons,
            vec![
                "application version changed: 1.0 -> 2.0".to_string(),
                "legacy-runtime artifact updated".to_string(),
                "assets bundle content changed".to_string(),
                "definitions feed updated: 20250101 -> 20250115".to_string(),
            ]
        );
    }
}
