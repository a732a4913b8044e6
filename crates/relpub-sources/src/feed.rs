//! Definitions feed preparation.
//!
//! Downloading and extracting the upstream archive is outside relpub; this
//! source consumes already-extracted segment files named
//! `{prefix}_{YYYYMMDD}.csv`, merges the primary segment with an optional
//! custom overlay, and writes one consolidated dataset into the data
//! directory, replacing any stale copy. The date token embedded in the
//! primary segment's filename is authoritative.

use std::io::Write;
use std::path::{Path, PathBuf};

use relpub_core::{DateToken, EventLog, FeedArtifact};

use crate::error::Result;
use crate::traits::DefinitionSource;

/// Where and how to prepare the feed.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Directory holding downloaded segment files.
    pub segment_dir: PathBuf,
    /// Directory the consolidated dataset is written to.
    pub data_dir: PathBuf,
    /// Resource name and output filename stem.
    pub feed_name: String,
    /// Filename prefix of the primary segment.
    pub primary_prefix: String,
    /// Filename prefix of the optional custom overlay segment.
    pub custom_prefix: Option<String>,
    /// Header row written to the consolidated dataset.
    pub header: Vec<String>,
}

/// Prepares the feed from extracted segment files on disk.
pub struct DirDefinitionSource {
    config: FeedConfig,
}

impl DirDefinitionSource {
    /// Create a source over a feed configuration.
    pub fn new(config: FeedConfig) -> Self {
        Self { config }
    }

    fn find_segment(&self, prefix: &str) -> Result<Option<PathBuf>> {
        if !self.config.segment_dir.is_dir() {
            return Ok(None);
        }
        let mut names: Vec<String> = Vec::new();
        for entry in std::fs::read_dir(&self.config.segment_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with(prefix) && name.ends_with(".csv") {
                names.push(name.to_string());
            }
        }
        // Lexicographic max: for `prefix_YYYYMMDD.csv` names that is also
        // the newest date.
        Ok(names
            .into_iter()
            .max()
            .map(|name| self.config.segment_dir.join(name)))
    }

    /// Data rows of a segment: comment lines (`#`) stripped, then the
    /// segment's own header row dropped.
    fn segment_rows(path: &Path) -> Result<Vec<String>> {
        let contents = std::fs::read_to_string(path)?;
        let mut rows: Vec<String> = contents
            .lines()
            .filter(|line| !line.starts_with('#') && !line.trim().is_empty())
            .map(str::to_string)
            .collect();
        if !rows.is_empty() {
            rows.remove(0);
        }
        Ok(rows)
    }

    fn remove_stale_copies(&self, keep: &Path, events: &mut EventLog) -> Result<()> {
        for entry in std::fs::read_dir(&self.config.data_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with(&self.config.feed_name)
                && name.ends_with(".csv")
                && entry.path() != keep
            {
                std::fs::remove_file(entry.path())?;
                events.info(format!("removed stale {name}"));
            }
        }
        Ok(())
    }

    fn try_refresh(&self, events: &mut EventLog) -> Result<Option<FeedArtifact>> {
        events.process(format!("preparing {} feed", self.config.feed_name));

        let Some(primary) = self.find_segment(&self.config.primary_prefix)? else {
            events.warning(format!(
                "no {}_*.csv segment in {}; feed omitted this run",
                self.config.primary_prefix,
                self.config.segment_dir.display()
            ));
            return Ok(None);
        };

        let primary_name = primary
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();
        let Some(date) = DateToken::find_in_filename(&primary_name) else {
            events.warning(format!(
                "segment {primary_name} carries no date token; feed omitted this run"
            ));
            return Ok(None);
        };

        let mut rows = Self::segment_rows(&primary)?;
        if let Some(custom_prefix) = &self.config.custom_prefix {
            if let Some(custom) = self.find_segment(custom_prefix)? {
                rows.extend(Self::segment_rows(&custom)?);
            }
        }

        std::fs::create_dir_all(&self.config.data_dir)?;
        let out_path = self
            .config
            .data_dir
            .join(format!("{}.csv", self.config.feed_name));
        self.remove_stale_copies(&out_path, events)?;

        let mut out = std::io::BufWriter::new(std::fs::File::create(&out_path)?);
        writeln!(out, "{}", self.config.header.join(","))?;
        for row in &rows {
            writeln!(out, "{row}")?;
        }
        out.flush()?;

        events.success(format!(
            "{} consolidated at version {date} ({} rows)",
            self.config.feed_name,
            rows.len()
        ));
        Ok(Some(FeedArtifact {
            name: self.config.feed_name.clone(),
            path: out_path,
            date,
        }))
    }
}

impl DefinitionSource for DirDefinitionSource {
    fn refresh(&self, events: &mut EventLog) -> Result<Option<FeedArtifact>> {
        match self.try_refresh(events) {
            Ok(artifact) => Ok(artifact),
            Err(err) => {
                // Feed failure is never fatal for the run.
                tracing::warn!(feed = %self.config.feed_name, error = %err, "feed refresh failed");
                events.error(format!(
                    "{} refresh failed: {err}; feed omitted this run",
                    self.config.feed_name
                ));
                Ok(None)
            }
        }
    }
}
