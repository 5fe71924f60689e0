// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Optional credential-name resolution used to label log entries.

use async_trait::async_trait;

/// Resolves a credential token to a human-readable display name.
///
/// Resolution is best-effort: failures and unknown credentials yield
/// `None` and the credential stays unlabeled. Nothing downstream depends
/// on a name being present.
#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn resolve_name(&self, credential: &str) -> Option<String>;
}
