//! Event log rendering.
//!
//! The engine and sources narrate through a structured [`EventLog`]; this
//! is the only place that turns it into terminal output.

use std::io::IsTerminal;

use relpub_core::{EventLevel, EventLog};

use crate::{Cli, ColorChoice};

const RESET: &str = "\x1b[0m";

/// Whether to emit ANSI colors for the given choice.
pub fn use_color(choice: ColorChoice) -> bool {
    match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal(),
    }
}

fn prefix(level: EventLevel, color: bool) -> String {
    let (label, code) = match level {
        EventLevel::Process => ("[....]", "\x1b[35m"),
        EventLevel::Info => ("[info]", "\x1b[34m"),
        EventLevel::Success => ("[ ok ]", "\x1b[32m"),
        EventLevel::Warning => ("[warn]", "\x1b[33m"),
        EventLevel::Error => ("[fail]", "\x1b[31m"),
    };
    if color {
        format!("{code}{label}{RESET}")
    } else {
        label.to_string()
    }
}

/// Print the run narration. With `--quiet`, only warnings and errors.
pub fn render_events(cli: &Cli, events: &EventLog) {
    let color = use_color(cli.color);
    for event in events.events() {
        if cli.quiet && !matches!(event.level, EventLevel::Warning | EventLevel::Error) {
            continue;
        }
        println!("{} {}", prefix(event.level, color), event.message);
    }
}

/// Print an itemized reason list.
pub fn render_reasons(reasons: &[String]) {
    for (i, reason) in reasons.iter().enumerate() {
        println!("  {}. {reason}", i + 1);
    }
}
