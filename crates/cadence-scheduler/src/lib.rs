// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recurring delivery scheduler for the Cadence loader bot.
//!
//! One tokio task per running loader, driven by an immutable plan snapshot
//! and stopped through the loader's cancellation token.

pub mod runner;

pub use runner::{LoaderRunner, SchedulerPolicies};
