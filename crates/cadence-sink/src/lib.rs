// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP message sink for the Cadence loader bot.
//!
//! Implements the `MessageSink` and `NameResolver` capabilities over a
//! remote posting API.

pub mod http;

pub use http::{HttpNameResolver, HttpSink};
