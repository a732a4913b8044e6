//! # Relpub Engine
//!
//! The manifest synchronization engine. Given the previously published
//! manifest and freshly observed candidate artifacts, the engine:
//!
//! 1. resolves a version for each resource under a per-kind policy
//!    ([`resolver`]),
//! 2. detects whether anything changed relative to the last publish
//!    ([`detector`]),
//! 3. and, only if so, deterministically rebuilds the manifest document
//!    ([`builder`]).
//!
//! The run as a whole is driven by [`SyncEngine`]: `Resolve -> Detect ->
//! {Stop | Build}`. Scanning candidate files and delivering the built
//! document belong to collaborators (`relpub-sources`), not the engine.
//!
//! Everything here is single-threaded and synchronous; the only
//! resource-sensitive operation is hashing multi-gigabyte files, which
//! [`digest::StreamingDigester`] does in bounded memory.

pub mod builder;
pub mod config;
pub mod detector;
pub mod digest;
pub mod error;
pub mod pipeline;
pub mod resolver;

pub use builder::ManifestBuilder;
pub use config::{EngineConfig, PublishLayout, ResourceMeta};
pub use detector::{detect, ChangeReport};
pub use digest::{DigestService, StreamingDigester};
pub use error::{EngineError, Result};
pub use pipeline::{RunOutcome, SyncEngine};
pub use resolver::{
    CompressedInfo, ResolvedApp, ResolvedResource, ResolvedVariant, ResourceFile, ResourceKind,
    VersionResolver,
};
