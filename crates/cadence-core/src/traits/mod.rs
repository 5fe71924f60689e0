// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits implemented by external collaborators.

pub mod resolver;
pub mod sink;

pub use resolver::NameResolver;
pub use sink::MessageSink;
