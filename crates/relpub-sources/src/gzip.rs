//! Gzip helpers for compressed bundles.
//!
//! The engine only ever hashes the decompressed counterpart; these helpers
//! let the operator (or `relpub sync --unpack`) materialize it from the
//! compressed file instead of decompressing by hand.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use flate2::read::GzDecoder;

use relpub_core::{BundleArtifact, EventLog};

use crate::error::{Result, SourceError};

/// Decompress a gzip file to `dst`, returning the decompressed byte count.
pub fn unpack_gzip(src: &Path, dst: &Path) -> Result<u64> {
    let input = File::open(src).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SourceError::NotFound {
                path: src.to_path_buf(),
            }
        } else {
            SourceError::Io(e)
        }
    })?;
    let mut decoder = GzDecoder::new(BufReader::new(input));
    let mut output = BufWriter::new(File::create(dst)?);
    let written = std::io::copy(&mut decoder, &mut output)?;
    Ok(written)
}

/// Make sure a bundle's decompressed counterpart exists, decompressing the
/// bundle when it does not. Returns whether anything was written.
pub fn materialize_counterpart(bundle: &BundleArtifact, events: &mut EventLog) -> Result<bool> {
    if bundle.counterpart_path.exists() {
        return Ok(false);
    }
    events.process(format!(
        "unpacking {} -> {}",
        bundle.compressed_path.display(),
        bundle.counterpart_path.display()
    ));
    let written = unpack_gzip(&bundle.compressed_path, &bundle.counterpart_path)?;
    events.success(format!("unpacked {written} bytes"));
    Ok(true)
}
