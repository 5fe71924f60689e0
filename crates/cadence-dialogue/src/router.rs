// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The command router's declarative command table.
//!
//! Matching is deterministic: specs are tried in table order, first match
//! wins, and every matcher works on the trimmed, lowercased message. The
//! engine executes the parsed [`Command`]; nothing here mutates state.

use std::str::FromStr;

use cadence_core::types::LoaderKind;

/// A parsed router command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Report the configured owner name.
    Owner,
    /// Canned greeting.
    Greeting,
    /// Creation attribution.
    Attribution,
    /// Current time in the configured timezone.
    Time,
    /// Clear the user's chat transcript.
    Clear,
    /// Create a new loader of the kind.
    Create(LoaderKind),
    /// Stop the current loader of the kind.
    StopKind(LoaderKind),
    /// Stop the post loader with this one-based index.
    StopIndex(usize),
    /// Recent log window for the post loader with this index.
    ConsoleIndex(usize),
    /// Log for the current loader of the kind; `full` returns everything,
    /// otherwise the most recent entries.
    Console { kind: LoaderKind, full: bool },
    /// Active/stopped report for the current loader of the kind.
    Status(LoaderKind),
    /// Anything the table does not match.
    Unrecognized,
}

/// One entry of the command table.
struct CommandSpec {
    /// Command name, for logs and the table's own documentation.
    #[allow(dead_code)]
    name: &'static str,
    matcher: fn(&str) -> Option<Command>,
}

/// The command table, in priority order. Kind-suffixed forms come before
/// the bare creation form so "post loader status" never creates a loader.
const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "owner",
        matcher: |m| (m == "owner name").then_some(Command::Owner),
    },
    CommandSpec {
        name: "greeting",
        matcher: |m| (m == "hlo").then_some(Command::Greeting),
    },
    CommandSpec {
        name: "attribution",
        matcher: |m| {
            (m == "who made you" || m == "apko kisne create kiya").then_some(Command::Attribution)
        },
    },
    CommandSpec {
        name: "time",
        matcher: |m| (m == "time").then_some(Command::Time),
    },
    CommandSpec {
        name: "clear",
        matcher: |m| (m == "clear").then_some(Command::Clear),
    },
    CommandSpec {
        name: "stop-kind",
        matcher: |m| {
            let rest = m.strip_prefix("stop ")?;
            let kind = rest.strip_suffix(" loader")?;
            LoaderKind::from_str(kind).ok().map(Command::StopKind)
        },
    },
    CommandSpec {
        name: "stop-index",
        matcher: |m| {
            let index = m.strip_prefix("stop loader ")?;
            index.parse().ok().map(Command::StopIndex)
        },
    },
    CommandSpec {
        name: "console-index",
        matcher: |m| {
            let index = m.strip_prefix("console ")?;
            index.parse().ok().map(Command::ConsoleIndex)
        },
    },
    CommandSpec {
        name: "full-console",
        matcher: |m| {
            let kind = m.strip_suffix(" loader full console")?;
            LoaderKind::from_str(kind)
                .ok()
                .map(|kind| Command::Console { kind, full: true })
        },
    },
    CommandSpec {
        name: "console",
        matcher: |m| {
            let kind = m.strip_suffix(" loader console")?;
            LoaderKind::from_str(kind)
                .ok()
                .map(|kind| Command::Console { kind, full: false })
        },
    },
    CommandSpec {
        name: "status",
        matcher: |m| {
            let kind = m.strip_suffix(" loader status")?;
            LoaderKind::from_str(kind).ok().map(Command::Status)
        },
    },
    CommandSpec {
        name: "create",
        matcher: |m| {
            let kind = m.strip_suffix(" loader")?;
            LoaderKind::from_str(kind).ok().map(Command::Create)
        },
    },
];

/// Parse a raw message into a command via the table.
pub fn parse_command(message: &str) -> Command {
    let normalized = message.trim().to_lowercase();
    for spec in COMMANDS {
        if let Some(command) = (spec.matcher)(&normalized) {
            return command;
        }
    }
    Command::Unrecognized
}
