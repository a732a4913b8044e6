//! The `relpub unpack` subcommand.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

use relpub_sources::unpack_gzip;

pub fn run(file: &Path, output: Option<&Path>) -> anyhow::Result<i32> {
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => default_output(file)?,
    };
    let written = unpack_gzip(file, &output)
        .with_context(|| format!("unpacking {}", file.display()))?;
    println!("unpacked {written} bytes to {}", output.display());
    Ok(0)
}

fn default_output(file: &Path) -> anyhow::Result<PathBuf> {
    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    for suffix in [".gzip", ".gz"] {
        if let Some(stem) = name.strip_suffix(suffix) {
            return Ok(file.with_file_name(stem));
        }
    }
    bail!("cannot derive output name from {name:?}; pass --output");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_strips_suffix() {
        assert_eq!(
            default_output(Path::new("/data/assets.db.gzip")).unwrap(),
            PathBuf::from("/data/assets.db")
        );
        assert_eq!(
            default_output(Path::new("feed.csv.gz")).unwrap(),
            PathBuf::from("feed.csv")
        );
        assert!(default_output(Path::new("plain.db")).is_err());
    }
}
