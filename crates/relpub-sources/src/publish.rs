//! Publish sinks: persist the manifest locally, optionally commit and push.
//!
//! Sink failures are delivery failures. The built document the engine
//! handed over stays valid; the caller decides whether to retry.

use std::path::PathBuf;
use std::process::Command;

use chrono::Utc;

use relpub_core::{EventLog, ManifestDocument};

use crate::error::{Result, SourceError};
use crate::traits::PublishSink;

/// Writes the manifest document to its well-known root path.
pub struct FsPublishSink {
    manifest_path: PathBuf,
}

impl FsPublishSink {
    /// Create a sink writing to `manifest_path`.
    pub fn new(manifest_path: PathBuf) -> Self {
        Self { manifest_path }
    }
}

impl PublishSink for FsPublishSink {
    fn publish(
        &self,
        document: &ManifestDocument,
        _changed_paths: &[PathBuf],
        events: &mut EventLog,
    ) -> Result<()> {
        std::fs::write(&self.manifest_path, document.to_json_bytes()?)?;
        events.success(format!("manifest written to {}", self.manifest_path.display()));
        Ok(())
    }
}

/// Persists the manifest, then stages, commits, and optionally pushes the
/// changed paths with the `git` CLI.
pub struct GitPublishSink {
    fs: FsPublishSink,
    repo_dir: PathBuf,
    remote: String,
    branch: String,
    push: bool,
}

impl GitPublishSink {
    /// Create a sink over a git working copy.
    pub fn new(
        repo_dir: PathBuf,
        manifest_path: PathBuf,
        remote: String,
        branch: String,
        push: bool,
    ) -> Self {
        Self {
            fs: FsPublishSink::new(manifest_path),
            repo_dir,
            remote,
            branch,
            push,
        }
    }

    fn git(&self, args: &[&str]) -> Result<()> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_dir)
            .args(args)
            .output()?;
        if !output.status.success() {
            return Err(SourceError::Git {
                op: args.first().copied().unwrap_or("?").to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }
}

impl PublishSink for GitPublishSink {
    fn publish(
        &self,
        document: &ManifestDocument,
        changed_paths: &[PathBuf],
        events: &mut EventLog,
    ) -> Result<()> {
        self.fs.publish(document, changed_paths, events)?;

        for path in changed_paths {
            let path_str = path.to_string_lossy();
            self.git(&["add", path_str.as_ref()])?;
            events.info(format!("staged {path_str}"));
        }

        let message = format!(
            "Auto-update v{} - {}",
            document.app.version,
            Utc::now().format("%Y-%m-%d %H:%M:%S")
        );
        self.git(&["commit", "-m", &message])?;
        events.success(format!("committed: {message}"));

        if self.push {
            self.git(&["push", &self.remote, &self.branch])?;
            events.success(format!("pushed to {}/{}", self.remote, self.branch));
        } else {
            events.info("push skipped");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use relpub_core::manifest::{AppDescriptor, ManifestDocument, SCHEMA_VERSION};
    use relpub_testkit::TempWorkspace;

    fn document() -> ManifestDocument {
        ManifestDocument {
            schema_version: SCHEMA_VERSION.to_string(),
            last_update: "2025-06-01T12:00:00Z".to_string(),
            app: AppDescriptor {
                version: "1.4".to_string(),
                release_date: "2025-06-01".to_string(),
                changelog: vec!["initial".to_string()],
                required: false,
                files: BTreeMap::new(),
            },
            resources: vec![],
        }
    }

    #[test]
    fn test_fs_sink_writes_manifest() {
        let ws = TempWorkspace::new();
        let sink = FsPublishSink::new(ws.manifest_path.clone());
        let mut events = EventLog::new();
        sink.publish(&document(), &[], &mut events).unwrap();

        let written = std::fs::read_to_string(&ws.manifest_path).unwrap();
        let parsed = ManifestDocument::from_json_str(&written).unwrap();
        assert_eq!(parsed.app.version, "1.4");
    }

    #[test]
    fn test_git_sink_commits_changed_paths() {
        if Command::new("git").arg("--version").output().is_err() {
            eprintln!("git not available; skipping");
            return;
        }

        let ws = TempWorkspace::new();
        let repo = ws.root.path();
        for args in [
            vec!["init", "-q"],
            vec!["config", "user.email", "relpub@localhost"],
            vec!["config", "user.name", "relpub"],
        ] {
            let status = Command::new("git")
                .arg("-C")
                .arg(repo)
                .args(&args)
                .status()
                .unwrap();
            assert!(status.success(), "git {args:?} failed");
        }

        let feed = ws.write_data("definitions.csv", b"header\nrow\n");
        let sink = GitPublishSink::new(
            repo.to_path_buf(),
            ws.manifest_path.clone(),
            "origin".to_string(),
            "main".to_string(),
            false,
        );
        let mut events = EventLog::new();
        sink.publish(&document(), &[ws.manifest_path.clone(), feed], &mut events)
            .unwrap();

        let output = Command::new("git")
            .arg("-C")
            .arg(repo)
            .args(["log", "--oneline"])
            .output()
            .unwrap();
        let log = String::from_utf8_lossy(&output.stdout);
        assert!(log.contains("Auto-update v1.4"));
    }
}
