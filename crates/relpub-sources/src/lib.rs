//! # Relpub Sources
//!
//! The engine's external collaborators: scanning candidate artifacts on
//! local storage, refreshing the definitions feed, decompressing bundles,
//! and delivering the built manifest (filesystem write, git commit/push).
//!
//! Everything here is an I/O wrapper. The interesting invariants live in
//! `relpub-engine`; this crate only observes files and delivers results.

pub mod error;
pub mod feed;
pub mod fs;
pub mod gzip;
pub mod publish;
pub mod traits;

pub use error::{Result, SourceError};
pub use feed::{DirDefinitionSource, FeedConfig};
pub use fs::{BundleScan, DirArtifactSource, ScanConfig};
pub use gzip::{materialize_counterpart, unpack_gzip};
pub use publish::{FsPublishSink, GitPublishSink};
pub use traits::{ArtifactSource, DefinitionSource, PublishSink};
