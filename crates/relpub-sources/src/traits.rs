//! Collaborator traits consumed and produced-to by the engine.
//!
//! The traits are synchronous: the whole pipeline is a single-threaded,
//! blocking run. Implementations narrate through the shared [`EventLog`]
//! rather than writing to a terminal.

use std::path::PathBuf;

use relpub_core::{BundleArtifact, EventLog, FeedArtifact, ManifestDocument, VariantArtifact};

use crate::error::Result;

/// Supplies candidate artifacts from local storage.
///
/// Implementations guarantee at most one variant artifact per variant tag;
/// the engine does not deduplicate.
pub trait ArtifactSource {
    /// The present primary-variant builds, at most one per variant.
    fn variant_artifacts(&self, events: &mut EventLog) -> Result<Vec<VariantArtifact>>;

    /// The present compressed bundles.
    fn bundle_artifacts(&self, events: &mut EventLog) -> Result<Vec<BundleArtifact>>;
}

/// Supplies the refreshed definitions dataset and its authoritative date
/// token.
pub trait DefinitionSource {
    /// Refresh the feed. `Ok(None)` means the feed is unavailable this
    /// run, which is never fatal; the resource is simply omitted.
    fn refresh(&self, events: &mut EventLog) -> Result<Option<FeedArtifact>>;
}

/// Receives the built manifest and the changed paths to persist/push.
///
/// A sink failure is a delivery failure: it never invalidates the already
/// built document.
pub trait PublishSink {
    /// Persist the document and stage the changed paths.
    fn publish(
        &self,
        document: &ManifestDocument,
        changed_paths: &[PathBuf],
        events: &mut EventLog,
    ) -> Result<()>;
}
