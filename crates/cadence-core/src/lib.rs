// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Cadence loader bot.
//!
//! This crate provides the error taxonomy, common types, and the
//! capability traits (`MessageSink`, `NameResolver`) implemented by
//! external collaborators. All other Cadence crates depend on it.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CadenceError;
pub use traits::{MessageSink, NameResolver};
pub use types::{
    Awaiting, Credential, ExhaustionPolicy, FailurePolicy, IterationStrategy, LoaderKind,
    LogEntry, LogOutcome, LogQuery, SessionToken, SinkReceipt, UserKey,
};
