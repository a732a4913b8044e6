//! The run pipeline: `Resolve -> Detect -> {Stop | Build}`.
//!
//! Scanning candidate files and publishing the result are collaborator
//! concerns; the engine's responsibility starts at resolution and ends
//! with a built document. There is no retry logic here.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use relpub_core::{CandidateArtifact, DateToken, EventLog, ManifestDocument};

use crate::builder::ManifestBuilder;
use crate::config::EngineConfig;
use crate::detector::detect;
use crate::digest::DigestService;
use crate::error::Result;
use crate::resolver::{ResourceKind, VersionResolver};

/// Terminal state of one engine run.
#[derive(Debug)]
pub enum RunOutcome {
    /// Nothing changed; the previous document stands and nothing is
    /// persisted.
    Unchanged {
        /// The (unchanged) application version.
        version: String,
    },
    /// Changes were detected and a new document was built. Delivery is the
    /// publish sink's job; its failure does not invalidate the document.
    Rebuilt {
        /// The freshly built manifest.
        document: ManifestDocument,
        /// Why a rebuild happened, in stable order.
        reasons: Vec<String>,
        /// Paths the sink should stage: the manifest itself plus changed
        /// resource data files. Compressed bundles are excluded; they go
        /// to the release store out of band.
        changed_paths: Vec<PathBuf>,
    },
}

/// Drives one synchronization run over resolved candidate artifacts.
pub struct SyncEngine<'a, D: DigestService> {
    config: &'a EngineConfig,
    digester: &'a D,
}

impl<'a, D: DigestService> SyncEngine<'a, D> {
    /// Create an engine over a configuration and digest service.
    pub fn new(config: &'a EngineConfig, digester: &'a D) -> Self {
        Self { config, digester }
    }

    /// Load the previously published manifest.
    ///
    /// Absent means first publish. A present-but-unparseable manifest also
    /// degrades to first publish, loudly: a corrupt document must never
    /// block the ability to republish.
    pub fn load_previous(&self, events: &mut EventLog) -> Option<ManifestDocument> {
        let path = &self.config.manifest_path;
        match std::fs::read_to_string(path) {
            Ok(contents) => match ManifestDocument::from_json_str(&contents) {
                Ok(doc) => {
                    events.info(format!(
                        "loaded previous manifest (application {})",
                        doc.app.version
                    ));
                    Some(doc)
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "previous manifest unreadable");
                    events.warning(format!(
                        "previous manifest unreadable ({err}); treating as first publish"
                    ));
                    None
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                events.info("no previous manifest; treating as first publish");
                None
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "could not read previous manifest");
                events.warning(format!(
                    "could not read previous manifest ({err}); treating as first publish"
                ));
                None
            }
        }
    }

    /// Run the pipeline over the supplied candidates.
    pub fn run(
        &self,
        candidates: &[CandidateArtifact],
        changelog: Option<&[String]>,
        now: DateTime<Utc>,
        events: &mut EventLog,
    ) -> Result<RunOutcome> {
        let previous = self.load_previous(events);

        let mut variants = Vec::new();
        let mut bundles = Vec::new();
        let mut feeds = Vec::new();
        for candidate in candidates {
            match candidate {
                CandidateArtifact::PrimaryVariant(v) => variants.push(v.clone()),
                CandidateArtifact::CompressedBundle(b) => bundles.push(b.clone()),
                CandidateArtifact::DatedFeed(f) => feeds.push(f.clone()),
            }
        }

        let resolver = VersionResolver::new(
            self.digester,
            previous.as_ref(),
            DateToken::from_date(now.date_naive()),
        );

        let app = resolver.resolve_app(&variants, events)?;

        let mut resources = Vec::new();
        for bundle in &bundles {
            let meta = self
                .config
                .meta_for(&bundle.name, ResourceKind::CompressedBundle);
            if let Some(resolved) = resolver.resolve_bundle(bundle, &meta, events)? {
                resources.push(resolved);
            }
        }
        for feed in &feeds {
            let meta = self.config.meta_for(&feed.name, ResourceKind::DatedFeed);
            resources.push(resolver.resolve_feed(feed, &meta, events));
        }

        let report = detect(previous.as_ref(), &app, &resources);
        if !report.changed {
            events.success("no changes detected; nothing to publish");
            return Ok(RunOutcome::Unchanged {
                version: app.version,
            });
        }
        for reason in &report.reasons {
            events.info(format!("change: {reason}"));
        }

        // Feed digests were deferred out of resolution; a publish is now
        // certain, so compute them for the document's checksum fields.
        for resource in &mut resources {
            if resource.file.digest.is_none() {
                resource.file.digest = Some(self.digester.digest(&resource.file.path)?);
            }
        }

        let document = ManifestBuilder::new(self.config).build(
            previous.as_ref(),
            &app,
            &resources,
            changelog,
            now,
        )?;

        let mut changed_paths = vec![self.config.manifest_path.clone()];
        for resource in &resources {
            match resource.kind {
                ResourceKind::DatedFeed => changed_paths.push(resource.file.path.clone()),
                ResourceKind::CompressedBundle => {
                    events.warning(format!(
                        "bundle {} must be uploaded to the release store separately",
                        resource.file.filename
                    ));
                }
            }
        }

        events.success(format!(
            "manifest rebuilt: {} change(s) detected",
            report.reasons.len()
        ));

        Ok(RunOutcome::Rebuilt {
            document,
            reasons: report.reasons,
            changed_paths,
        })
    }
}
