// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dialogue pipeline for the Cadence loader bot.
//!
//! The chat engine receives resolved chat turns and answers them through
//! two paths: the dialogue interpreter while a loader is collecting
//! configuration, and the command router otherwise.

pub mod engine;
pub mod interpreter;
pub mod reply;
pub mod router;

pub use engine::ChatEngine;
pub use reply::ReplyCatalog;
pub use router::{Command, parse_command};
