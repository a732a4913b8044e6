//! # Relpub Core
//!
//! Pure data model for the relpub release publisher: content digests,
//! candidate artifacts, version tokens, and the manifest document itself.
//!
//! This crate contains no I/O. Hashing, filesystem scanning, and publishing
//! live in `relpub-engine` and `relpub-sources`.
//!
//! ## Key Types
//!
//! - [`ContentDigest`] - size plus strong/weak hashes of one file
//! - [`CandidateArtifact`] - a freshly observed artifact, tagged by kind
//! - [`DateToken`] - an 8-digit `YYYYMMDD` version identifier
//! - [`ManifestDocument`] - the persisted release manifest
//! - [`EventLog`] - ordered narration emitted by pipeline components

pub mod artifact;
pub mod digest;
pub mod error;
pub mod event;
pub mod manifest;
pub mod version;

pub use artifact::{
    ArtifactKind, BundleArtifact, CandidateArtifact, FeedArtifact, VariantArtifact, VariantTag,
};
pub use digest::{ContentDigest, Md5Digest, Sha256Digest};
pub use error::CoreError;
pub use event::{Event, EventLevel, EventLog};
pub use manifest::{
    AppDescriptor, Checksum, FileDescriptor, ManifestDocument, ResourceDescriptor, SCHEMA_VERSION,
};
pub use version::{DateToken, ResolvedVersion};
