//! Relpub CLI: publishes a versioned release manifest from freshly built
//! artifacts and auxiliary data resources.
//!
//! Provides `relpub sync` for the full pipeline, `relpub check` for a
//! detect-only dry pass, `relpub digest` for hashing a single file, and
//! `relpub unpack` for decompressing a bundle by hand.

mod check;
mod config;
mod digest;
mod render;
mod sync;
mod unpack;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Relpub, the release manifest publisher.
#[derive(Parser, Debug)]
#[command(name = "relpub", version, about = "Release manifest publisher")]
pub struct Cli {
    /// Suppress all output except warnings and errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) diagnostics.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to the `relpub.toml` configuration file.
    #[arg(long, global = true, default_value = "relpub.toml")]
    pub config: PathBuf,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full pipeline: scan, resolve, detect, build, publish.
    Sync(SyncArgs),
    /// Resolve and detect only; exit 1 when a publish would happen.
    Check,
    /// Print the streaming digest of one file.
    Digest {
        /// File to digest.
        path: PathBuf,
    },
    /// Decompress a gzip bundle.
    Unpack {
        /// Compressed file.
        file: PathBuf,
        /// Output path (default: input with the gzip suffix removed).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Arguments for the `relpub sync` subcommand.
#[derive(Parser, Debug)]
pub struct SyncArgs {
    /// Build the manifest but publish nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Commit without pushing.
    #[arg(long)]
    pub no_push: bool,

    /// Decompress a bundle whose counterpart is missing before resolving.
    #[arg(long)]
    pub unpack: bool,

    /// Skip the publish confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,

    /// Changelog lines for this publish (default: a generated entry).
    #[arg(long, num_args = 1..)]
    pub changelog: Vec<String>,
}

/// Control for colored output.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorChoice {
    /// Color when stdout is a terminal.
    Auto,
    /// Always color.
    Always,
    /// Never color.
    Never,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let code = match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            1
        }
    };
    process::exit(code);
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Command::Sync(args) => {
            let config = config::load_config(&cli.config)?;
            sync::run(cli, &config, args)
        }
        Command::Check => {
            let config = config::load_config(&cli.config)?;
            check::run(cli, &config)
        }
        Command::Digest { path } => digest::run(path),
        Command::Unpack { file, output } => unpack::run(file, output.as_deref()),
    }
}
