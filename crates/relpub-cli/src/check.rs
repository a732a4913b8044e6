//! The `relpub check` subcommand: resolve and detect, publish nothing.
//!
//! Exit code 1 when a publish would happen, 0 when everything is up to
//! date, so CI can gate on it.

use anyhow::Context;
use chrono::Utc;

use relpub_core::{CandidateArtifact, EventLog};
use relpub_engine::{RunOutcome, StreamingDigester, SyncEngine};
use relpub_sources::{ArtifactSource, DefinitionSource, DirArtifactSource, DirDefinitionSource};

use crate::config::Config;
use crate::render;
use crate::Cli;

pub fn run(cli: &Cli, config: &Config) -> anyhow::Result<i32> {
    let mut events = EventLog::new();

    let artifacts = DirArtifactSource::new(config.scan_config());
    let mut candidates: Vec<CandidateArtifact> = Vec::new();
    for variant in artifacts
        .variant_artifacts(&mut events)
        .context("scanning build artifacts")?
    {
        candidates.push(CandidateArtifact::PrimaryVariant(variant));
    }
    for bundle in artifacts
        .bundle_artifacts(&mut events)
        .context("scanning bundles")?
    {
        candidates.push(CandidateArtifact::CompressedBundle(bundle));
    }
    if let Some(feed_config) = config.feed_config() {
        if let Some(feed) = DirDefinitionSource::new(feed_config).refresh(&mut events)? {
            candidates.push(CandidateArtifact::DatedFeed(feed));
        }
    }

    let engine_config = config.engine_config();
    let digester = StreamingDigester::new();
    let engine = SyncEngine::new(&engine_config, &digester);
    let outcome = engine.run(&candidates, None, Utc::now(), &mut events)?;

    render::render_events(cli, &events);
    match outcome {
        RunOutcome::Unchanged { version } => {
            if !cli.quiet {
                println!("\nup to date at version {version}");
            }
            Ok(0)
        }
        RunOutcome::Rebuilt { reasons, .. } => {
            println!("\na publish is pending:");
            render::render_reasons(&reasons);
            Ok(1)
        }
    }
}
