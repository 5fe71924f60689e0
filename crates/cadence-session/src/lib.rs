// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user session state for the Cadence loader bot.
//!
//! Holds the in-memory loader registry, chat transcripts, and capped
//! delivery logs. State lives for the process lifetime only; there is no
//! persistence layer by design, a restart clears all sessions.

pub mod loader;
pub mod store;

pub use loader::{Loader, LoaderPlan};
pub use store::{SessionStore, Speaker, StoreLimits, TranscriptEntry, UserState};
