//! The `relpub sync` subcommand: the full publish pipeline.

use std::io::Write;

use anyhow::Context;
use chrono::Utc;

use relpub_core::{CandidateArtifact, EventLog, ManifestDocument};
use relpub_engine::{RunOutcome, StreamingDigester, SyncEngine};
use relpub_sources::{
    materialize_counterpart, ArtifactSource, DefinitionSource, DirArtifactSource,
    DirDefinitionSource, FsPublishSink, GitPublishSink, PublishSink,
};

use crate::config::Config;
use crate::render;
use crate::{Cli, SyncArgs};

pub fn run(cli: &Cli, config: &Config, args: &SyncArgs) -> anyhow::Result<i32> {
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
        if args.unpack {
            materialize_counterpart(&bundle, &mut events)
                .with_context(|| format!("unpacking bundle {}", bundle.name))?;
        }
        candidates.push(CandidateArtifact::CompressedBundle(bundle));
    }

    if let Some(feed_config) = config.feed_config() {
        let feed_source = DirDefinitionSource::new(feed_config);
        if let Some(feed) = feed_source.refresh(&mut events)? {
            candidates.push(CandidateArtifact::DatedFeed(feed));
        }
    }

    let engine_config = config.engine_config();
    let digester = StreamingDigester::new();
    let engine = SyncEngine::new(&engine_config, &digester);
    let changelog = (!args.changelog.is_empty()).then_some(args.changelog.as_slice());
    let outcome = engine.run(&candidates, changelog, Utc::now(), &mut events);

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(err) => {
            render::render_events(cli, &events);
            return Err(err).context("synchronization failed");
        }
    };

    match outcome {
        RunOutcome::Unchanged { version } => {
            render::render_events(cli, &events);
            if !cli.quiet {
                println!("\neverything up to date at version {version}; nothing published");
            }
            Ok(0)
        }
        RunOutcome::Rebuilt {
            document,
            reasons,
            changed_paths,
        } => {
            render::render_events(cli, &events);
            println!("\nchanges detected:");
            render::render_reasons(&reasons);

            if args.dry_run {
                println!("\ndry run: would publish {}", engine_config.manifest_path.display());
                return Ok(0);
            }

            if !args.yes && !confirm("publish now? (y/n): ")? {
                println!("publish skipped; nothing persisted");
                return Ok(0);
            }

            let mut publish_events = EventLog::new();
            publish(config, args, &document, &changed_paths, &mut publish_events)?;
            render::render_events(cli, &publish_events);

            print_summary(&document);
            Ok(0)
        }
    }
}

fn publish(
    config: &Config,
    args: &SyncArgs,
    document: &ManifestDocument,
    changed_paths: &[std::path::PathBuf],
    events: &mut EventLog,
) -> anyhow::Result<()> {
    match &config.git {
        Some(git) => {
            let sink = GitPublishSink::new(
                git.repo_dir.clone(),
                config.engine_config().manifest_path,
                git.remote.clone(),
                git.branch.clone(),
                !args.no_push,
            );
            sink.publish(document, changed_paths, events)
                .context("git publish failed; the built manifest is still valid")?;
        }
        None => {
            let sink = FsPublishSink::new(config.engine_config().manifest_path);
            sink.publish(document, changed_paths, events)
                .context("writing manifest failed")?;
        }
    }
    Ok(())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("\n{prompt}");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

fn print_summary(document: &ManifestDocument) {
    println!("\npublished version {}", document.app.version);
    for (tag, file) in &document.app.files {
        println!("  {tag}: {} bytes", file.size);
    }
    for resource in &document.resources {
        println!("  {} {} ({})", resource.name, resource.version, resource.display_name);
    }
}
