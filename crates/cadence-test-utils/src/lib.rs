// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared test fixtures for the Cadence loader bot.
//!
//! Provides the mock message sink and the end-to-end test harness used
//! by integration tests across the workspace.

pub mod harness;
pub mod mock_sink;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_sink::{Delivery, FixedNameResolver, MockSink};
