//! The `relpub digest` subcommand.

use std::path::Path;

use anyhow::Context;

use relpub_engine::{DigestService, StreamingDigester};

pub fn run(path: &Path) -> anyhow::Result<i32> {
    let digest = StreamingDigester::new()
        .digest(path)
        .with_context(|| format!("digesting {}", path.display()))?;
    println!("size:   {}", digest.size_bytes);
    println!("sha256: {}", digest.sha256);
    println!("md5:    {}", digest.md5);
    Ok(0)
}
