// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity resolution for the Cadence loader bot.
//!
//! Maps request credentials (identifier and/or session token) to stable
//! user keys backed by a flat JSON registry, so per-user loader state
//! survives reconnects even though session state itself is in-memory.

pub mod names;
pub mod resolver;
pub mod store;

pub use resolver::{IdentityResolver, RequestCredentials, ResolvedIdentity};
pub use store::{IdentityStore, UserRecord};
